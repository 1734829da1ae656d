//! Per-operation state machines.
//!
//! A session owns the cipher, the chunk position and the byte counters for
//! one container. Sessions are not shared and are dropped (with their key
//! schedule) when the operation ends.

use std::io::Write;

use crate::container::frame::Frame;
use crate::crypto::aead::ChunkCipher;
use crate::crypto::kdf::Key;
use crate::crypto::nonce::{self, NonceSequence};
use crate::engine::StreamStats;
use crate::error::Result;

pub struct EncryptSession {
    cipher: ChunkCipher,
    nonces: NonceSequence,
    stats: StreamStats,
}

impl EncryptSession {
    /// Start a session; `first_chunk` seeds the base nonce and must be the
    /// plaintext later passed to the first [`seal_chunk`](Self::seal_chunk).
    pub fn new(key: &Key, first_chunk: &[u8]) -> Result<Self> {
        let base = nonce::synthetic_iv(key, first_chunk)?;
        Ok(Self {
            cipher: ChunkCipher::new(key)?,
            nonces: NonceSequence::new(base),
            stats: StreamStats::default(),
        })
    }

    pub fn nonces(&self) -> &NonceSequence {
        &self.nonces
    }

    pub fn seal_chunk(&mut self, plaintext: &[u8]) -> Result<Frame> {
        let index = self.nonces.next_chunk();
        let nonce = self.nonces.next_nonce()?;
        let ciphertext = self.cipher.seal(&nonce, plaintext)?;
        let frame = Frame::new(nonce, ciphertext);

        tracing::debug!(
            chunk = index,
            plaintext = plaintext.len(),
            ciphertext = frame.ciphertext.len(),
            "sealed chunk"
        );

        self.stats.chunks += 1;
        self.stats.plaintext_bytes += plaintext.len() as u64;
        self.stats.container_bytes += frame.encoded_len() as u64;
        Ok(frame)
    }

    pub fn write_chunk<W: Write + ?Sized>(
        &mut self,
        output: &mut W,
        plaintext: &[u8],
    ) -> Result<()> {
        let frame = self.seal_chunk(plaintext)?;
        frame.write_to(output)
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }
}

pub struct DecryptSession {
    cipher: ChunkCipher,
    next_chunk: u64,
    stats: StreamStats,
}

impl DecryptSession {
    pub fn new(key: &Key) -> Result<Self> {
        Ok(Self {
            cipher: ChunkCipher::new(key)?,
            next_chunk: 0,
            stats: StreamStats::default(),
        })
    }

    /// Frames are authenticated with whatever nonce they carry; order is
    /// only tracked for error reporting.
    pub fn open_frame(&mut self, frame: &Frame) -> Result<Vec<u8>> {
        let index = self.next_chunk;
        let plaintext = self.cipher.open(index, &frame.nonce, &frame.ciphertext)?;

        tracing::debug!(chunk = index, plaintext = plaintext.len(), "opened chunk");

        self.next_chunk += 1;
        self.stats.chunks += 1;
        self.stats.plaintext_bytes += plaintext.len() as u64;
        self.stats.container_bytes += frame.encoded_len() as u64;
        Ok(plaintext)
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::format::TAG_LENGTH;
    use crate::crypto::kdf::key_from_bytes;
    use crate::error::FileCryptError;

    fn test_key() -> Key {
        key_from_bytes([0x42u8; 32])
    }

    #[test]
    fn test_first_frame_uses_synthetic_iv() {
        let key = test_key();
        let mut session = EncryptSession::new(&key, b"first").unwrap();
        let frame = session.seal_chunk(b"first").unwrap();
        assert_eq!(frame.nonce, nonce::synthetic_iv(&key, b"first").unwrap());
        assert_eq!(frame.ciphertext.len(), 5 + TAG_LENGTH);
    }

    #[test]
    fn test_later_frames_use_counter() {
        let key = test_key();
        let mut session = EncryptSession::new(&key, b"abc").unwrap();
        let base = *session.nonces().base();

        let frames: Vec<Frame> = [b"abc", b"def", b"ghi"]
            .iter()
            .map(|chunk| session.seal_chunk(*chunk).unwrap())
            .collect();

        assert_eq!(frames[0].nonce, base);
        for (i, frame) in frames.iter().enumerate().skip(1) {
            assert_eq!(&frame.nonce[..4], &base[..4]);
            assert_eq!(&frame.nonce[4..], &((i - 1) as u64).to_be_bytes());
        }
    }

    #[test]
    fn test_sessions_roundtrip_and_count() {
        let key = test_key();
        let mut enc = EncryptSession::new(&key, b"one").unwrap();
        let frames = vec![enc.seal_chunk(b"one").unwrap(), enc.seal_chunk(b"two!").unwrap()];

        let mut dec = DecryptSession::new(&key).unwrap();
        assert_eq!(dec.open_frame(&frames[0]).unwrap(), b"one");
        assert_eq!(dec.open_frame(&frames[1]).unwrap(), b"two!");

        assert_eq!(enc.stats(), dec.stats());
        assert_eq!(dec.stats().chunks, 2);
        assert_eq!(dec.stats().plaintext_bytes, 7);
    }

    #[test]
    fn test_authentication_error_reports_chunk_index() {
        let key = test_key();
        let mut enc = EncryptSession::new(&key, b"a").unwrap();
        let good = enc.seal_chunk(b"a").unwrap();
        let mut bad = enc.seal_chunk(b"b").unwrap();
        bad.ciphertext[0] ^= 0x80;

        let mut dec = DecryptSession::new(&key).unwrap();
        dec.open_frame(&good).unwrap();
        let result = dec.open_frame(&bad);
        assert!(matches!(result, Err(FileCryptError::Authentication { chunk: 1 })));
    }
}
