//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// An upper-case variable name (e.g., DATABASE_URL).
pub type VarName = String;

/// A value as stored on disk: base64 of a fernet token.
pub type EncryptedValue = String;

/// An environment name (e.g., staging). Also the file stem.
pub type EnvName = String;
