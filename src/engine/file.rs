use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::crypto::key_provider::KeyProvider;
use crate::engine::{self, Mode, StreamStats};
use crate::error::{FileCryptError, Result};

const DECRYPTED_EXTENSION: &str = "dec";

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Replace an existing output file instead of refusing.
    pub overwrite: bool,
}

/// Encrypt the file at `input` into a container at `output`.
///
/// On failure the partially written output is left in place.
pub fn encrypt_file<P: KeyProvider + ?Sized>(
    input: &Path,
    output: &Path,
    provider: &P,
    options: &WriteOptions,
) -> Result<StreamStats> {
    with_files(input, output, options, |reader, writer| {
        engine::encrypt(reader, writer, provider)
    })
}

/// Decrypt the container at `input` into `output`.
///
/// Plaintext of frames that verified before a failure is left in `output`.
pub fn decrypt_file<P: KeyProvider + ?Sized>(
    input: &Path,
    output: &Path,
    provider: &P,
    options: &WriteOptions,
) -> Result<StreamStats> {
    with_files(input, output, options, |reader, writer| {
        engine::decrypt(reader, writer, provider)
    })
}

/// Output path used when the caller gives none: `name.enc` when encrypting,
/// `name` from `name.enc` when decrypting (`name.dec` for other inputs).
pub fn default_output_path(input: &Path, mode: Mode, config: &AppConfig) -> PathBuf {
    let extension = config.encrypted_extension.trim_start_matches('.');
    match mode {
        Mode::Encrypt => with_appended_extension(input, extension),
        Mode::Decrypt => {
            if !extension.is_empty() && input.extension() == Some(OsStr::new(extension)) {
                input.with_extension("")
            } else {
                with_appended_extension(input, DECRYPTED_EXTENSION)
            }
        }
    }
}

fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Both handles live only for the duration of `op`, so they are closed on
/// every exit path.
fn with_files<F>(input: &Path, output: &Path, options: &WriteOptions, op: F) -> Result<StreamStats>
where
    F: FnOnce(&mut BufReader<File>, &mut BufWriter<File>) -> Result<StreamStats>,
{
    check_paths(input, output, options)?;

    let mut reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(open_output(output, options.overwrite)?);
    tracing::debug!(input = %input.display(), output = %output.display(), "opened files");

    let stats = op(&mut reader, &mut writer)?;

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(stats)
}

fn check_paths(input: &Path, output: &Path, options: &WriteOptions) -> Result<()> {
    if !output.exists() {
        return Ok(());
    }
    if fs::canonicalize(input)? == fs::canonicalize(output)? {
        tracing::warn!(path = %output.display(), "refusing to overwrite the input file");
        return Err(FileCryptError::SamePath(output.to_path_buf()));
    }
    if !options.overwrite {
        tracing::warn!(path = %output.display(), "output exists");
        return Err(FileCryptError::OutputExists(output.to_path_buf()));
    }
    Ok(())
}

fn open_output(path: &Path, overwrite: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    Ok(options.open(path)?)
}
