use argon2::{Algorithm, Argon2, Block, Params, Version};
use rand::RngCore;
use secrecy::{ExposeSecretMut, SecretBox};
use zeroize::Zeroize;

use crate::container::format::{Salt, KEY_LENGTH, SALT_LENGTH};
use crate::error::{FileCryptError, Result};

/// A derived 256-bit key. Zeroized on drop, redacted in `Debug`.
pub type Key = SecretBox<[u8; KEY_LENGTH]>;

/// Argon2id cost parameters.
///
/// The defaults are part of the container format: a file encrypted with other
/// parameters cannot be decrypted by this tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost_kib: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Fast parameters for testing only.
    pub fn insecure_fast() -> Self {
        Self {
            memory_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }
}

pub fn generate_salt() -> Salt {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

pub fn key_from_bytes(bytes: [u8; KEY_LENGTH]) -> Key {
    SecretBox::new(Box::new(bytes))
}

pub fn derive_key(password: &[u8], salt: &Salt) -> Result<Key> {
    derive_key_with(password, salt, &KdfParams::default())
}

pub fn derive_key_with(password: &[u8], salt: &Salt, params: &KdfParams) -> Result<Key> {
    let argon2_params = Params::new(
        params.memory_cost_kib,
        params.time_cost,
        params.parallelism,
        Some(KEY_LENGTH),
    )
    .map_err(|e| FileCryptError::Kdf(e.to_string()))?;

    let mut blocks = allocate_blocks(argon2_params.block_count())?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = key_from_bytes([0u8; KEY_LENGTH]);
    let result = argon2.hash_password_into_with_memory(
        password,
        salt,
        key.expose_secret_mut(),
        blocks.as_mut_slice(),
    );
    blocks.zeroize();
    result.map_err(|e| FileCryptError::Kdf(e.to_string()))?;

    Ok(key)
}

/// Reserve the Argon2 working memory up front so an allocation failure is
/// reported instead of aborting the process.
fn allocate_blocks(count: usize) -> Result<Vec<Block>> {
    let mut blocks = Vec::<Block>::new();
    blocks.try_reserve_exact(count).map_err(|e| {
        FileCryptError::Kdf(format!("cannot allocate {count} Argon2 memory blocks: {e}"))
    })?;
    blocks.resize(count, Block::default());
    Ok(blocks)
}
