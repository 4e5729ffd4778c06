//! Fernet encryption backend implementation.
//!
//! Tokens are additionally wrapped in standard base64, which is what
//! environment files have always stored.

use std::fmt::Debug;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::Cipher;
use crate::core::constants;
use crate::error::{CipherError, Error, Result};

/// Fernet (AES-128-CBC + HMAC-SHA256) backend.
pub struct Fernet;

impl Cipher for Fernet {
    type Key = ::fernet::Fernet;

    fn generate_key(&self) -> Zeroizing<String> {
        Zeroizing::new(::fernet::Fernet::generate_key())
    }

    fn parse_key(&self, key: &str) -> Result<::fernet::Fernet> {
        ::fernet::Fernet::new(key.trim()).ok_or_else(|| CipherError::InvalidKey.into())
    }

    fn encrypt(&self, plaintext: &str, key: &::fernet::Fernet) -> Result<String> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let token = key.encrypt(plaintext.as_bytes());
        let encoded = STANDARD.encode(token.as_bytes());

        trace!(ciphertext_len = encoded.len(), "encrypted");
        Ok(encoded)
    }

    fn decrypt(&self, encrypted: &str, key: &::fernet::Fernet) -> Result<String> {
        trace!(ciphertext_len = encrypted.len(), "decrypting");

        let token = STANDARD
            .decode(encrypted.trim())
            .map_err(|e| rejected("outer base64", e))?;
        let token = String::from_utf8(token).map_err(|e| rejected("token encoding", e))?;
        let plaintext = key
            .decrypt(&token)
            .map_err(|e| rejected("fernet token", e))?;

        trace!(plaintext_len = plaintext.len(), "decrypted");

        String::from_utf8(plaintext).map_err(|e| rejected("plaintext encoding", e))
    }

    fn family(&self) -> &'static str {
        constants::DEFAULT_FAMILY
    }

    fn name(&self) -> &'static str {
        constants::DEFAULT_ALGORITHM
    }
}

/// Log the concrete cause for operators, hand back the opaque error.
fn rejected(stage: &'static str, cause: impl Debug) -> Error {
    debug!(stage, cause = ?cause, "decryption rejected");
    CipherError::DecryptionFailed.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cipher = Fernet;
        let key = cipher.parse_key(&cipher.generate_key()).unwrap();

        let plaintext = "Hello, World!";
        let encrypted = cipher.encrypt(plaintext, &key).unwrap();

        assert_ne!(encrypted, plaintext);
        assert!(!encrypted.contains('\n'));

        let decrypted = cipher.decrypt(&encrypted, &key).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_generated_key_length() {
        let key = Fernet.generate_key();
        assert_eq!(key.len(), constants::KEY_LENGTH);
    }

    #[test]
    fn test_wrong_key_is_opaque() {
        let cipher = Fernet;
        let k1 = cipher.parse_key(&cipher.generate_key()).unwrap();
        let k2 = cipher.parse_key(&cipher.generate_key()).unwrap();

        let encrypted = cipher.encrypt("engage!", &k1).unwrap();
        let err = cipher.decrypt(&encrypted, &k2).unwrap_err();

        assert!(matches!(err, Error::Cipher(CipherError::DecryptionFailed)));
    }

    #[test]
    fn test_garbage_is_opaque() {
        let cipher = Fernet;
        let key = cipher.parse_key(&cipher.generate_key()).unwrap();

        for input in ["", "not base64 !!!", "aGVsbG8="] {
            let err = cipher.decrypt(input, &key).unwrap_err();
            assert!(matches!(err, Error::Cipher(CipherError::DecryptionFailed)));
        }
    }

    #[test]
    fn test_parse_invalid_key() {
        assert!(matches!(
            Fernet.parse_key("too-short"),
            Err(Error::Cipher(CipherError::InvalidKey))
        ));
    }
}
