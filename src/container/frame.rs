//! Framing of the container: salt header and per-chunk frames.
//!
//! A frame is `nonce[12] | length:u32be | ciphertext[length]`. There is no
//! chunk index and no trailer, so the only end-of-container signal is EOF
//! landing exactly on a frame boundary.

use std::io::{self, Read, Write};

use crate::container::format::{
    NonceBytes, Salt, LENGTH_FIELD, MAX_CIPHERTEXT_LENGTH, NONCE_LENGTH, SALT_LENGTH, TAG_LENGTH,
};
use crate::error::{FileCryptError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub nonce: NonceBytes,
    pub ciphertext: Vec<u8>,
}

impl Frame {
    pub fn new(nonce: NonceBytes, ciphertext: Vec<u8>) -> Self {
        Self { nonce, ciphertext }
    }

    /// Bytes this frame occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        NONCE_LENGTH + LENGTH_FIELD + self.ciphertext.len()
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let length = u32::try_from(self.ciphertext.len()).map_err(|_| {
            FileCryptError::Encryption(format!(
                "ciphertext of {} bytes does not fit the length field",
                self.ciphertext.len()
            ))
        })?;

        writer.write_all(&self.nonce)?;
        writer.write_all(&length.to_be_bytes())?;
        writer.write_all(&self.ciphertext)?;
        Ok(())
    }

    /// Read the next frame. `Ok(None)` means the stream ended cleanly
    /// between frames; any partial frame is an invalid container.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Self>> {
        let mut nonce = [0u8; NONCE_LENGTH];
        match read_full(reader, &mut nonce)? {
            0 => return Ok(None),
            NONCE_LENGTH => {}
            n => {
                return Err(FileCryptError::invalid_container(format!(
                    "truncated nonce: got {n} of {NONCE_LENGTH} bytes"
                )))
            }
        }

        let mut length_bytes = [0u8; LENGTH_FIELD];
        read_exact_or_truncated(reader, &mut length_bytes, "length field")?;
        let length = u32::from_be_bytes(length_bytes) as usize;

        if length < TAG_LENGTH {
            return Err(FileCryptError::invalid_container(format!(
                "ciphertext length {length} is shorter than the authentication tag"
            )));
        }
        if length > MAX_CIPHERTEXT_LENGTH {
            return Err(FileCryptError::invalid_container(format!(
                "ciphertext length {length} exceeds the maximum of {MAX_CIPHERTEXT_LENGTH}"
            )));
        }

        let mut ciphertext = vec![0u8; length];
        read_exact_or_truncated(reader, &mut ciphertext, "ciphertext")?;

        Ok(Some(Self { nonce, ciphertext }))
    }
}

pub fn write_salt<W: Write + ?Sized>(writer: &mut W, salt: &Salt) -> Result<()> {
    writer.write_all(salt)?;
    Ok(())
}

pub fn read_salt<R: Read + ?Sized>(reader: &mut R) -> Result<Salt> {
    let mut salt = [0u8; SALT_LENGTH];
    read_exact_or_truncated(reader, &mut salt, "salt")?;
    Ok(salt)
}

/// Read until `buf` is full or the reader hits EOF, returning the number of
/// bytes read. Unlike `read_exact`, a short count is not an error.
pub(crate) fn read_full<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_exact_or_truncated<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    what: &str,
) -> Result<()> {
    let n = read_full(reader, buf)?;
    if n != buf.len() {
        return Err(FileCryptError::invalid_container(format!(
            "truncated {what}: got {n} of {} bytes",
            buf.len()
        )));
    }
    Ok(())
}
