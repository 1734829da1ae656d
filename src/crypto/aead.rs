use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use secrecy::ExposeSecret;

use crate::container::format::NonceBytes;
use crate::crypto::kdf::Key;
use crate::error::{FileCryptError, Result};

/// AES-256-GCM over a single chunk, without associated data.
pub struct ChunkCipher {
    cipher: Aes256Gcm,
}

impl ChunkCipher {
    pub fn new(key: &Key) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key.expose_secret())
            .map_err(|e| FileCryptError::Encryption(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Returns the ciphertext with the 16-byte tag appended.
    pub fn seal(&self, nonce: &NonceBytes, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| FileCryptError::Encryption(e.to_string()))
    }

    /// `chunk` is only used to report which frame failed.
    pub fn open(&self, chunk: u64, nonce: &NonceBytes, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| FileCryptError::Authentication { chunk })
    }
}
