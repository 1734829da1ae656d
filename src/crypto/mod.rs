pub mod aead;
pub mod kdf;
pub mod key_provider;
pub mod nonce;
