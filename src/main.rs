#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use file_encryptor::config::AppConfig;
use file_encryptor::crypto::key_provider::PromptKeyProvider;
use file_encryptor::engine::{self, Mode, WriteOptions};

#[derive(Parser)]
#[command(
    name = "file-encryptor",
    version,
    about = "Encrypt and decrypt files with a password (AES-256-GCM, Argon2id)"
)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log every chunk to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt a file into a password-protected container
    Encrypt(FileArgs),
    /// Decrypt a container produced by `encrypt`
    Decrypt(FileArgs),
}

#[derive(Args)]
struct FileArgs {
    /// Input file path
    #[arg(short, long = "in")]
    input: PathBuf,

    /// Output file path (derived from the input when omitted)
    #[arg(short, long = "out")]
    output: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    force: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    init_logging(&config, cli.verbose);

    let (mode, args) = match cli.command {
        Command::Encrypt(args) => (Mode::Encrypt, args),
        Command::Decrypt(args) => (Mode::Decrypt, args),
    };

    let output = args
        .output
        .unwrap_or_else(|| engine::default_output_path(&args.input, mode, &config));
    let options = WriteOptions {
        overwrite: args.force || config.overwrite,
    };

    let (result, verb) = match mode {
        Mode::Encrypt => {
            let provider = PromptKeyProvider::new(config.confirm_password);
            let result = engine::encrypt_file(&args.input, &output, &provider, &options);
            (result, "Encryption")
        }
        Mode::Decrypt => {
            let provider = PromptKeyProvider::new(false);
            let result = engine::decrypt_file(&args.input, &output, &provider, &options);
            (result, "Decryption")
        }
    };

    match result {
        Ok(stats) => {
            tracing::debug!(chunks = stats.chunks, "done");
            println!("{verb} succeeded: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{verb} failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> AppConfig {
    match path {
        Some(path) => AppConfig::load_from(path).unwrap_or_else(|e| {
            eprintln!("Warning: could not load config: {e}");
            AppConfig::default()
        }),
        None => AppConfig::load().unwrap_or_default(),
    }
}

fn init_logging(config: &AppConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
