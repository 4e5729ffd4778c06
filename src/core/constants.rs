//! Constants used throughout envcrypt.
//!
//! Centralizes the on-disk vocabulary and other magic strings.

/// Extension of environment files (`<name>.env`).
pub const FILE_EXTENSION: &str = "env";

/// Project configuration file name.
pub const CONFIG_FILE: &str = ".envcrypt.toml";

/// Environment variable holding the key when none is passed explicitly.
pub const KEY_VAR: &str = "KEY";

/// Glob pattern matching every environment name.
pub const DEFAULT_PATTERN: &str = "*";

/// Plaintext environment name.
pub const NAME: &str = "name";

/// Ciphertext of the environment name, used as the authorization check.
pub const SIGNED_NAME: &str = "signed_name";

/// Ciphertext of the generated per-environment secret.
pub const SECRET_KEY: &str = "SECRET_KEY";

/// Crypto family. The misspelling is part of the file format.
pub const CRYPTO_FAMILY: &str = "cryto_family";

/// Crypto algorithm.
pub const CRYPTO_ALGORITHM: &str = "crypto_algorithm";

/// Schema version of the file.
pub const VERSION: &str = "version";

/// Schema version written by this release.
pub const CURRENT_VERSION: &str = "0.8.4";

/// Default crypto family for files that predate the metadata fields.
pub const DEFAULT_FAMILY: &str = "symmetric";

/// Default crypto algorithm for files that predate the metadata fields.
pub const DEFAULT_ALGORITHM: &str = "fernet";

/// Keys that are never user variables.
pub const RESERVED: &[&str] = &[
    NAME,
    SIGNED_NAME,
    SECRET_KEY,
    CRYPTO_ALGORITHM,
    CRYPTO_FAMILY,
    VERSION,
];

/// Length of the generated secret.
pub const SECRET_SIZE: usize = 50;

/// Alphabet of the generated secret.
pub const SECRET_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*(-_=+)";

/// Length of an encoded fernet key (32 bytes, URL-safe base64, padded).
pub const KEY_LENGTH: usize = 44;
