//! Streaming encryption and decryption of whole containers.
//!
//! Memory use is bounded by one chunk in each direction: the input is read
//! in `CHUNK_SIZE` blocks and every frame is written before the next block
//! is read.

pub mod file;
pub mod session;

use std::io::{Read, Write};

use crate::container::format::{Salt, CHUNK_SIZE};
use crate::container::frame::{self, Frame};
use crate::crypto::kdf;
use crate::crypto::key_provider::KeyProvider;
use crate::error::{FileCryptError, Result};

pub use file::{decrypt_file, default_output_path, encrypt_file, WriteOptions};
pub use session::{DecryptSession, EncryptSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// Counters reported at the end of an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub chunks: u64,
    pub plaintext_bytes: u64,
    /// Frame bytes only; the salt is not included.
    pub container_bytes: u64,
}

/// Encrypt `input` into a new container on `output` under a fresh salt.
pub fn encrypt<R, W, P>(input: &mut R, output: &mut W, provider: &P) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    P: KeyProvider + ?Sized,
{
    encrypt_with_salt(input, output, provider, kdf::generate_salt())
}

/// Like [`encrypt`] with a caller-chosen salt. Reusing a salt with the same
/// password reuses the key, so this is only meant for reproducible tests.
pub fn encrypt_with_salt<R, W, P>(
    input: &mut R,
    output: &mut W,
    provider: &P,
    salt: Salt,
) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    P: KeyProvider + ?Sized,
{
    let key = provider.provide_key(&salt)?;
    frame::write_salt(output, &salt)?;
    tracing::info!("encrypting");

    let mut buf = vec![0u8; CHUNK_SIZE];

    // The first frame is always written, even for empty input, so an empty
    // file still produces a verifiable container.
    let n = frame::read_full(input, &mut buf)?;
    let mut session = EncryptSession::new(&key, &buf[..n])?;
    session.write_chunk(output, &buf[..n])?;

    loop {
        let n = frame::read_full(input, &mut buf)?;
        if n == 0 {
            break;
        }
        session.write_chunk(output, &buf[..n])?;
    }

    output.flush()?;

    let stats = session.stats();
    tracing::info!(
        chunks = stats.chunks,
        bytes = stats.plaintext_bytes,
        "encryption finished"
    );
    Ok(stats)
}

/// Decrypt a container from `input`, writing plaintext to `output` as each
/// frame verifies. On failure, plaintext of earlier frames stays written.
pub fn decrypt<R, W, P>(input: &mut R, output: &mut W, provider: &P) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    P: KeyProvider + ?Sized,
{
    let salt = frame::read_salt(input)?;
    let key = provider.provide_key(&salt)?;
    tracing::info!("decrypting");

    let mut session = DecryptSession::new(&key)?;
    while let Some(frame) = Frame::read_from(input)? {
        let plaintext = session.open_frame(&frame)?;
        output.write_all(&plaintext)?;
    }

    output.flush()?;

    let stats = session.stats();
    tracing::info!(
        chunks = stats.chunks,
        bytes = stats.plaintext_bytes,
        "decryption finished"
    );
    Ok(stats)
}
