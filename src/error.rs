//! Error types.
//!
//! One enum per concern, wrapped by [`Error`]. Cipher failures are
//! deliberately coarse: callers only ever see [`CipherError::DecryptionFailed`]
//! no matter what went wrong inside the cipher.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

/// Cipher boundary errors.
#[derive(Error, Debug)]
pub enum CipherError {
    /// The key itself is malformed (wrong length or encoding).
    #[error("invalid key: not a valid fernet key")]
    InvalidKey,

    /// Any failure while decrypting. Carries no detail on purpose.
    #[error("decryption failed")]
    DecryptionFailed,
}

/// Errors from loading, mutating or saving a single environment file.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("invalid environment file {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("the supplied key cannot decrypt environment '{0}'")]
    InvalidKey(String),

    #[error("variable already exists: {0} (use --force to overwrite)")]
    VariableExists(String),

    #[error("variable not found: {0}")]
    VariableNotFound(String),

    #[error("'{0}' is a reserved name and cannot be used as a variable")]
    Reserved(String),

    #[error("environment file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to write environment file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from resolving the active environment out of a set of files.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("the {0} variable is not set and no key was supplied")]
    EnvKeyNotFound(String),

    #[error("no environment files match '{0}'")]
    NoEnvironments(String),

    #[error("no environment can be decrypted with the supplied key")]
    DeploymentLevelNotFound,

    #[error("the supplied key decrypts more than one environment: {}", .0.join(", "))]
    Ambiguous(Vec<String>),

    #[error("unknown deployment level: {0}")]
    UnknownLevel(String),

    #[error("variables missing across environments: {}", .0.join(", "))]
    VariableMissing(Vec<String>),
}

/// Project configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("invalid variable name '{key}': {reason}")]
    InvalidName { key: String, reason: String },

    #[error("invalid environment name '{name}': {reason}")]
    InvalidEnvironment { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the failure means "this key does not open that file".
    pub fn is_invalid_key(&self) -> bool {
        matches!(
            self,
            Error::State(StateError::InvalidKey(_)) | Error::Cipher(CipherError::DecryptionFailed)
        )
    }
}
