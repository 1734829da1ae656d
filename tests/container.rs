use std::collections::HashSet;
use std::io::Cursor;

use secrecy::SecretString;

use file_encryptor::container::format::{
    Salt, CHUNK_SIZE, FRAME_HEADER_LENGTH, NONCE_LENGTH, SALT_LENGTH,
};
use file_encryptor::container::frame::{self, Frame};
use file_encryptor::crypto::kdf::KdfParams;
use file_encryptor::crypto::key_provider::{FixedKeyProvider, KeyProvider, PasswordKeyProvider};
use file_encryptor::engine::encrypt_with_salt;
use file_encryptor::{decrypt, encrypt, ErrorKind, FileCryptError};

fn fixed() -> FixedKeyProvider {
    FixedKeyProvider::new([0u8; 32])
}

fn seal_with(plaintext: &[u8], provider: &dyn KeyProvider) -> Vec<u8> {
    let mut out = Vec::new();
    encrypt(&mut Cursor::new(plaintext), &mut out, provider).unwrap();
    out
}

fn open_with(container: &[u8], provider: &dyn KeyProvider) -> Result<Vec<u8>, FileCryptError> {
    let mut out = Vec::new();
    decrypt(&mut Cursor::new(container), &mut out, provider)?;
    Ok(out)
}

fn random_bytes(len: usize) -> Vec<u8> {
    use rand::RngCore;
    let mut data = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

fn padded_salt(raw: &[u8]) -> Salt {
    let mut salt = [0u8; SALT_LENGTH];
    let len = raw.len().min(SALT_LENGTH);
    salt[..len].copy_from_slice(&raw[..len]);
    salt
}

/// Parse a container into its frames, returning each frame's byte offset.
fn frames(container: &[u8]) -> Vec<(usize, Frame)> {
    let mut cursor = Cursor::new(container);
    frame::read_salt(&mut cursor).unwrap();
    let mut out = Vec::new();
    loop {
        let offset = cursor.position() as usize;
        match Frame::read_from(&mut cursor).unwrap() {
            Some(frame) => out.push((offset, frame)),
            None => break,
        }
    }
    out
}

#[test]
fn test_password_scenario() {
    let provider = PasswordKeyProvider::new(SecretString::from("test-password-123"));
    let salt = padded_salt(b"test-salt-123");

    let mut container = Vec::new();
    encrypt_with_salt(
        &mut Cursor::new(b"Hello, World!"),
        &mut container,
        &provider,
        salt,
    )
    .unwrap();

    assert_eq!(&container[..SALT_LENGTH], &salt);
    assert_eq!(open_with(&container, &provider).unwrap(), b"Hello, World!");
}

#[test]
fn test_fresh_salts_change_container() {
    let provider = PasswordKeyProvider::new(SecretString::from("test-password-123"))
        .with_params(KdfParams::insecure_fast());
    let first = seal_with(b"Hello, World!", &provider);
    let second = seal_with(b"Hello, World!", &provider);

    assert_ne!(first[..SALT_LENGTH], second[..SALT_LENGTH]);
    assert_ne!(first, second);
    assert_eq!(open_with(&first, &provider).unwrap(), b"Hello, World!");
    assert_eq!(open_with(&second, &provider).unwrap(), b"Hello, World!");
}

#[test]
fn test_wrong_password_fails_authentication() {
    let params = KdfParams::insecure_fast();
    let right = PasswordKeyProvider::new(SecretString::from("right")).with_params(params.clone());
    let wrong = PasswordKeyProvider::new(SecretString::from("wrong")).with_params(params);

    let container = seal_with(b"secret data", &right);
    let err = open_with(&container, &wrong).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_roundtrip_random_sizes() {
    for len in [0, 1024, CHUNK_SIZE, 2 * 1024 * 1024, 5 * CHUNK_SIZE + 17] {
        let data = random_bytes(len);
        let container = seal_with(&data, &fixed());
        assert_ne!(container, data);
        assert_eq!(open_with(&container, &fixed()).unwrap(), data, "length {len}");
    }
}

#[test]
fn test_empty_file_container() {
    let container = seal_with(b"", &fixed());
    let parsed = frames(&container);
    assert_eq!(parsed.len(), 1);
    assert!(open_with(&container, &fixed()).unwrap().is_empty());
}

#[test]
fn test_salt_only_container_is_empty_file() {
    let container = seal_with(b"", &fixed());
    let salt_only = &container[..SALT_LENGTH];
    assert!(frames(salt_only).is_empty());
    assert!(open_with(salt_only, &fixed()).unwrap().is_empty());
}

#[test]
fn test_ciphertext_differs_from_plaintext() {
    let data = b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_vec();
    let container = seal_with(&data, &fixed());
    let (_, first) = &frames(&container)[0];
    assert_ne!(&first.ciphertext[..data.len()], data.as_slice());
}

#[test]
fn test_counter_nonces_are_distinct() {
    let data = random_bytes(10 * CHUNK_SIZE + 1);
    let container = seal_with(&data, &fixed());
    let parsed = frames(&container);
    assert_eq!(parsed.len(), 11);

    let base = parsed[0].1.nonce;
    let counters: HashSet<[u8; NONCE_LENGTH]> =
        parsed[1..].iter().map(|(_, f)| f.nonce).collect();
    assert_eq!(counters.len(), 10);

    for (i, (_, frame)) in parsed.iter().enumerate().skip(1) {
        assert_eq!(&frame.nonce[..4], &base[..4]);
        assert_eq!(&frame.nonce[4..], &((i - 1) as u64).to_be_bytes());
    }
}

#[test]
fn test_tampering_is_detected() {
    let data = random_bytes(CHUNK_SIZE + 50);
    let container = seal_with(&data, &fixed());

    for (offset, frame) in frames(&container) {
        // Every bit of the nonce and length field.
        let mut positions: Vec<usize> = (offset..offset + FRAME_HEADER_LENGTH).collect();
        // A sample of ciphertext bytes, including the tag at the end.
        let body = offset + FRAME_HEADER_LENGTH;
        let end = body + frame.ciphertext.len();
        positions.extend([body, body + 1, body + frame.ciphertext.len() / 2, end - 17, end - 1]);

        for pos in positions {
            for bit in 0..8 {
                let mut tampered = container.clone();
                tampered[pos] ^= 1 << bit;
                let err = open_with(&tampered, &fixed())
                    .expect_err("tampered container must not decrypt");
                assert!(
                    matches!(err.kind(), ErrorKind::Authentication | ErrorKind::Format),
                    "byte {pos} bit {bit}: unexpected error {err}"
                );
            }
        }
    }
}

#[test]
fn test_frame_boundary_truncation() {
    let data = random_bytes(2 * CHUNK_SIZE);
    let container = seal_with(&data, &fixed());
    let parsed = frames(&container);

    // Frame boundaries are valid end points: the container carries no length.
    let cut = parsed[1].0;
    assert_eq!(open_with(&container[..cut], &fixed()).unwrap(), &data[..CHUNK_SIZE]);

    let err = open_with(&container[..cut + 5], &fixed()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}
