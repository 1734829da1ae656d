use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileCryptError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("KDF error: {0}")]
    Kdf(String),

    #[error("Invalid container: {reason}")]
    InvalidContainer { reason: String },

    #[error("Authentication failed for chunk {chunk}: wrong password or tampered data")]
    Authentication { chunk: u64 },

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Password prompt failed: {0}")]
    PasswordPrompt(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Input and output refer to the same file: {}", .0.display())]
    SamePath(PathBuf),

    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

/// Coarse classification of a failure, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    KeyDerivation,
    Format,
    Authentication,
    Other,
}

impl FileCryptError {
    pub fn invalid_container(reason: impl Into<String>) -> Self {
        FileCryptError::InvalidContainer {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FileCryptError::Io(_) => ErrorKind::Io,
            FileCryptError::Kdf(_) => ErrorKind::KeyDerivation,
            FileCryptError::InvalidContainer { .. } => ErrorKind::Format,
            FileCryptError::Authentication { .. } => ErrorKind::Authentication,
            _ => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileCryptError>;
