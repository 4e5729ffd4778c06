//! Cryptographic operations.
//!
//! Provides the symmetric cipher abstraction and its implementation.
//! Only Fernet exists today; the trait keeps the door open for the
//! `crypto_algorithm` field of environment files to name something else.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Cipher` trait
//! 2. Add the implementation in a new file
//! 3. Re-export from this module

use zeroize::Zeroizing;

use crate::error::Result;

mod fernet;

pub use self::fernet::Fernet;

/// Symmetric cipher backend trait.
///
/// Implementations must collapse every decryption failure into
/// `CipherError::DecryptionFailed` and only log the underlying cause.
pub trait Cipher {
    /// Parsed, ready-to-use key material.
    type Key;

    /// Generate a fresh key in its canonical text encoding.
    fn generate_key(&self) -> Zeroizing<String>;

    /// Parse a text-encoded key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` if the key is malformed.
    fn parse_key(&self, key: &str) -> Result<Self::Key>;

    /// Encrypt plaintext into a printable ciphertext.
    ///
    /// The same plaintext may produce different ciphertext on every call.
    fn encrypt(&self, plaintext: &str, key: &Self::Key) -> Result<String>;

    /// Decrypt a ciphertext produced by `encrypt`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` on any failure.
    fn decrypt(&self, encrypted: &str, key: &Self::Key) -> Result<String>;

    /// Crypto family recorded in environment files.
    fn family(&self) -> &'static str;

    /// Algorithm name recorded in environment files.
    fn name(&self) -> &'static str;
}
