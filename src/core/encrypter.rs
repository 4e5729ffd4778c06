//! A single key bound to the cipher.
//!
//! Every environment file is read and written through exactly one
//! `Encrypter`. Constructing one validates the key up front, so a
//! malformed key (`CipherError::InvalidKey`) is never confused with a
//! key that simply belongs to another environment
//! (`CipherError::DecryptionFailed`).

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::core::cipher::{Cipher, Fernet};
use crate::error::Result;

/// A validated key plus the cipher it drives.
pub struct Encrypter {
    key: Zeroizing<String>,
    inner: ::fernet::Fernet,
}

impl std::fmt::Debug for Encrypter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encrypter")
            .field("key", &"<redacted>")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl Encrypter {
    /// Generate a fresh random key (44 characters).
    pub fn generate_key() -> Zeroizing<String> {
        Fernet.generate_key()
    }

    /// Bind a key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` if the key is malformed.
    pub fn new(key: &str) -> Result<Self> {
        let inner = Fernet.parse_key(key)?;
        Ok(Self {
            key: Zeroizing::new(key.trim().to_string()),
            inner,
        })
    }

    /// Bind a freshly generated key.
    pub fn generate() -> Result<Self> {
        Self::new(&Self::generate_key())
    }

    /// Encrypt a value into its on-disk representation.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        Fernet.encrypt(plaintext, &self.inner)
    }

    /// Decrypt an on-disk value.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` for any failure: malformed
    /// input, wrong key or tampered payload all look the same.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        Fernet.decrypt(ciphertext, &self.inner)
    }

    /// The key in its text encoding.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Short, non-reversible identifier for the key.
    ///
    /// First 8 bytes of SHA-256 over the encoded key, hex encoded.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key.as_bytes());
        digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Crypto family written to environment files.
    pub fn family(&self) -> &'static str {
        Fernet.family()
    }

    /// Crypto algorithm written to environment files.
    pub fn algorithm(&self) -> &'static str {
        Fernet.name()
    }
}
