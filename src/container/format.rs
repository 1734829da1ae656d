/// Length of the salt stored at the start of every container.
pub const SALT_LENGTH: usize = 16;

/// Length of the AES-256-GCM nonce in bytes.
pub const NONCE_LENGTH: usize = 12;

/// Length of the derived AES-256 key in bytes.
pub const KEY_LENGTH: usize = 32;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LENGTH: usize = 16;

/// The ciphertext length is serialized as a big-endian u32.
pub const LENGTH_FIELD: usize = 4;

/// Plaintext bytes per chunk.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Largest ciphertext a well-formed frame may carry.
pub const MAX_CIPHERTEXT_LENGTH: usize = CHUNK_SIZE + TAG_LENGTH;

/// Frame header: nonce(12) + length(4).
pub const FRAME_HEADER_LENGTH: usize = NONCE_LENGTH + LENGTH_FIELD;

/// Smallest valid container: salt(16) + one empty frame (header + tag).
pub const MIN_CONTAINER_SIZE: usize = SALT_LENGTH + FRAME_HEADER_LENGTH + TAG_LENGTH;

pub type Salt = [u8; SALT_LENGTH];
pub type NonceBytes = [u8; NONCE_LENGTH];
