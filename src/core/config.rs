//! Project configuration.
//!
//! An optional `.envcrypt.toml` in the environments directory overrides the
//! resolution defaults:
//!
//! ```toml
//! [envcrypt]
//! pattern = "prod-*"
//! key_var = "APP_KEY"
//! require_key = true
//! reject_ambiguous = true
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::core::constants;
use crate::core::state_list::StateListOptions;
use crate::error::{ConfigError, Result};

/// Contents of `.envcrypt.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub envcrypt: Settings,
}

/// The `[envcrypt]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Glob for environment names.
    pub pattern: String,
    /// Variable holding the key.
    pub key_var: String,
    /// Fail instead of resolving to nothing when no key is available.
    pub require_key: bool,
    /// Fail when one key opens several environments.
    pub reject_ambiguous: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pattern: constants::DEFAULT_PATTERN.to_string(),
            key_var: constants::KEY_VAR.to_string(),
            require_key: false,
            reject_ambiguous: false,
        }
    }
}

impl Config {
    /// Load `.envcrypt.toml` from `dir`, or defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` or `ConfigError::Parse` for an
    /// unreadable or malformed file, and `ConfigError::InvalidValue` for
    /// an empty pattern or a bad key variable name.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(constants::CONFIG_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;

        debug!(
            path = %path.display(),
            pattern = %config.envcrypt.pattern,
            key_var = %config.envcrypt.key_var,
            "config loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let settings = &self.envcrypt;

        if settings.pattern.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "pattern",
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        let var = &settings.key_var;
        let valid_var = !var.is_empty()
            && !var.starts_with(|c: char| c.is_ascii_digit())
            && var.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_var {
            return Err(ConfigError::InvalidValue {
                field: "key_var",
                reason: format!("'{}' is not a valid environment variable name", var),
            }
            .into());
        }

        Ok(())
    }

    /// Resolution options for `dir` under this configuration.
    pub fn options(&self, dir: &Path) -> StateListOptions {
        StateListOptions {
            directory: dir.to_path_buf(),
            pattern: self.envcrypt.pattern.clone(),
            key_var: self.envcrypt.key_var.clone(),
            require_key: self.envcrypt.require_key,
            require_active: false,
            reject_ambiguous: self.envcrypt.reject_ambiguous,
        }
    }
}
