#![forbid(unsafe_code)]

pub mod config;
pub mod container;
pub mod crypto;
pub mod engine;
pub mod error;

pub use engine::{decrypt, encrypt, StreamStats};
pub use error::{ErrorKind, FileCryptError, Result};
