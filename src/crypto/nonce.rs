//! Per-chunk nonce derivation.
//!
//! Chunk 0 uses a synthetic IV: the first 12 bytes of `AES-256(key, 0^16)`
//! XORed with the leading plaintext bytes of that chunk. Every later chunk
//! `i` uses the first 4 bytes of that base nonce followed by the big-endian
//! counter `i - 1`.
//!
//! Known weakness: chunk 0's nonce is not drawn from the counter space, so if
//! the base nonce's last 8 bytes are all zero it equals chunk 1's nonce. The
//! scheme is kept as-is for compatibility with existing containers.

use aes_gcm::aes::cipher::{BlockEncrypt, KeyInit};
use aes_gcm::aes::{Aes256, Block};
use secrecy::ExposeSecret;

use crate::container::format::{NonceBytes, NONCE_LENGTH};
use crate::crypto::kdf::Key;
use crate::error::{FileCryptError, Result};

const COUNTER_OFFSET: usize = NONCE_LENGTH - 8;

pub fn synthetic_iv(key: &Key, first_chunk: &[u8]) -> Result<NonceBytes> {
    let cipher = Aes256::new_from_slice(key.expose_secret())
        .map_err(|e| FileCryptError::Encryption(e.to_string()))?;

    let mut block = Block::default();
    cipher.encrypt_block(&mut block);

    let mut iv = [0u8; NONCE_LENGTH];
    iv.copy_from_slice(&block[..NONCE_LENGTH]);
    for (byte, p) in iv.iter_mut().zip(first_chunk) {
        *byte ^= p;
    }
    Ok(iv)
}

/// Nonce state for one encryption session.
#[derive(Debug, Clone)]
pub struct NonceSequence {
    base: NonceBytes,
    next_chunk: u64,
}

impl NonceSequence {
    pub fn new(base: NonceBytes) -> Self {
        Self {
            base,
            next_chunk: 0,
        }
    }

    pub fn base(&self) -> &NonceBytes {
        &self.base
    }

    /// Index of the chunk the next call to [`next_nonce`](Self::next_nonce) serves.
    pub fn next_chunk(&self) -> u64 {
        self.next_chunk
    }

    /// Nonce for chunk `index`, independent of the sequence position.
    pub fn nonce_for_chunk(&self, index: u64) -> NonceBytes {
        if index == 0 {
            return self.base;
        }
        let mut nonce = self.base;
        nonce[COUNTER_OFFSET..].copy_from_slice(&(index - 1).to_be_bytes());
        nonce
    }

    pub fn next_nonce(&mut self) -> Result<NonceBytes> {
        let index = self.next_chunk;
        self.next_chunk = index
            .checked_add(1)
            .ok_or_else(|| FileCryptError::Encryption("nonce counter exhausted".to_string()))?;
        Ok(self.nonce_for_chunk(index))
    }
}
