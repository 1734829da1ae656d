use secrecy::{ExposeSecret, SecretString};

use crate::container::format::{Salt, KEY_LENGTH};
use crate::crypto::kdf::{self, KdfParams, Key};
use crate::error::{FileCryptError, Result};

/// Source of the container key for a given salt.
///
/// The engine calls this exactly once per operation, after the salt is known.
pub trait KeyProvider {
    fn provide_key(&self, salt: &Salt) -> Result<Key>;
}

impl<F> KeyProvider for F
where
    F: Fn(&Salt) -> Result<Key>,
{
    fn provide_key(&self, salt: &Salt) -> Result<Key> {
        self(salt)
    }
}

/// Derives the key from a password already held in memory.
pub struct PasswordKeyProvider {
    password: SecretString,
    params: KdfParams,
}

impl PasswordKeyProvider {
    pub fn new(password: SecretString) -> Self {
        Self {
            password,
            params: KdfParams::default(),
        }
    }

    /// Override the Argon2id costs. Containers written this way only decrypt
    /// with the same parameters.
    pub fn with_params(mut self, params: KdfParams) -> Self {
        self.params = params;
        self
    }
}

impl KeyProvider for PasswordKeyProvider {
    fn provide_key(&self, salt: &Salt) -> Result<Key> {
        kdf::derive_key_with(self.password.expose_secret().as_bytes(), salt, &self.params)
    }
}

/// Returns the same key for every salt.
pub struct FixedKeyProvider {
    key: Key,
}

impl FixedKeyProvider {
    pub fn new(key: [u8; KEY_LENGTH]) -> Self {
        Self {
            key: kdf::key_from_bytes(key),
        }
    }
}

impl KeyProvider for FixedKeyProvider {
    fn provide_key(&self, _salt: &Salt) -> Result<Key> {
        Ok(kdf::key_from_bytes(*self.key.expose_secret()))
    }
}

/// Reads the password from the controlling terminal without echo.
pub struct PromptKeyProvider {
    confirm: bool,
}

impl PromptKeyProvider {
    /// `confirm` asks for the password twice; use it when encrypting.
    pub fn new(confirm: bool) -> Self {
        Self { confirm }
    }

    fn read_password(&self) -> Result<SecretString> {
        let password = prompt("Enter password: ")?;
        if password.expose_secret().is_empty() {
            return Err(FileCryptError::EmptyPassword);
        }
        if self.confirm {
            let again = prompt("Confirm password: ")?;
            if again.expose_secret() != password.expose_secret() {
                return Err(FileCryptError::PasswordMismatch);
            }
        }
        Ok(password)
    }
}

impl KeyProvider for PromptKeyProvider {
    fn provide_key(&self, salt: &Salt) -> Result<Key> {
        let password = self.read_password()?;
        tracing::debug!("deriving key with Argon2id");
        kdf::derive_key(password.expose_secret().as_bytes(), salt)
    }
}

fn prompt(message: &str) -> Result<SecretString> {
    rpassword::prompt_password(message)
        .map(SecretString::from)
        .map_err(|e| FileCryptError::PasswordPrompt(e.to_string()))
}
