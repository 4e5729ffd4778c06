//! Command-line interface.

pub mod completions;
pub mod create;
pub mod crypt;
pub mod env;
pub mod inventory;
pub mod keys;
pub mod output;
pub mod run;
pub mod vars;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use zeroize::Zeroizing;

use crate::core::config::Config;
use crate::core::state::State;
use crate::core::state_list::{StateList, StateListOptions};
use crate::error::{ResolveError, Result};

/// Envcrypt - per-environment encrypted configuration.
#[derive(Parser)]
#[command(
    name = "envcrypt",
    about = "Per-environment encrypted configuration files",
    version,
    after_help = "The key you hold decides which environment you are in."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: Global,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command.
#[derive(Args, Clone, Debug, Default)]
pub struct Global {
    /// Environment key (defaults to the KEY variable)
    #[arg(short, long, global = true)]
    pub key: Option<String>,

    /// Directory holding the environment files
    #[arg(short, long, global = true, env = "ENVCRYPT_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Glob selecting environment names (overrides .envcrypt.toml)
    #[arg(short, long, global = true)]
    pub pattern: Option<String>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print a fresh key
    GenerateKey,

    /// Create a new environment file with its own key
    Create {
        /// Environment name (e.g. staging)
        name: String,
    },

    /// Add a variable to the active environment
    Add {
        /// Variable name (upper-cased)
        name: String,
        /// Value; read from stdin or prompted for when omitted
        value: Option<String>,
        /// Overwrite if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a variable from the active environment
    Remove {
        /// Variable name
        name: String,
    },

    /// Show the active environment's variables
    Show {
        /// Only this variable, printed raw
        #[arg(short, long)]
        name: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every environment and whether the key opens it
    List,

    /// Report variables that differ between unlocked environments
    Check {
        /// Exit non-zero when anything is missing
        #[arg(long)]
        strict: bool,
    },

    /// Copy the active environment's variables into the one another key opens
    Transcode {
        /// Key of the target environment
        #[arg(short, long)]
        transcode_key: String,
        /// Overwrite variables that already exist in the target
        #[arg(short, long)]
        force: bool,
    },

    /// Re-encrypt the active environment under a new key
    Rotate,

    /// Encrypt a single value with the key
    Encrypt {
        /// Plaintext
        value: String,
    },

    /// Decrypt a single value with the key
    Decrypt {
        /// Ciphertext produced by `encrypt`
        value: String,
    },

    /// Write the active environment as a dotenv file
    Export {
        /// Destination file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add every variable of a dotenv file to the active environment
    Import {
        /// Path to the dotenv file
        path: PathBuf,
        /// Overwrite variables that already exist
        #[arg(short, long)]
        force: bool,
    },

    /// Run a command with the active environment's variables set
    Run {
        /// Command and arguments to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Everything a command needs to find its environments.
pub struct Context {
    key: Option<Zeroizing<String>>,
    options: StateListOptions,
}

impl Context {
    /// Merge global flags over `.envcrypt.toml`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the config file is present but invalid.
    pub fn new(global: &Global) -> Result<Self> {
        let config = Config::load(&global.dir)?;
        let mut options = config.options(&global.dir);
        if let Some(pattern) = &global.pattern {
            options.pattern = pattern.clone();
        }

        Ok(Self {
            key: global.key.clone().map(Zeroizing::new),
            options,
        })
    }

    /// The explicit key, or the configured key variable.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::EnvKeyNotFound` if neither is set.
    pub fn key(&self) -> Result<Zeroizing<String>> {
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }
        std::env::var(&self.options.key_var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Zeroizing::new)
            .ok_or_else(|| ResolveError::EnvKeyNotFound(self.options.key_var.clone()).into())
    }

    /// Every environment, without requiring one to be active.
    pub fn list(&self) -> Result<StateList> {
        let key = self.key()?;
        StateList::new(Some(key.as_str()), &self.options)
    }

    /// Resolve with `key`, failing unless an environment is active.
    pub fn resolve_with(&self, key: &str) -> Result<StateList> {
        let options = StateListOptions {
            require_active: true,
            ..self.options.clone()
        };
        StateList::new(Some(key), &options)
    }

    /// Resolve with the caller's key, strictly.
    pub fn resolve(&self) -> Result<StateList> {
        let key = self.key()?;
        self.resolve_with(&key)
    }

    /// The environment `key` opens.
    pub fn active_with(&self, key: &str) -> Result<State> {
        self.resolve_with(key)?
            .into_active()
            .ok_or_else(|| ResolveError::DeploymentLevelNotFound.into())
    }

    /// The environment the caller's key opens.
    pub fn active(&self) -> Result<State> {
        let key = self.key()?;
        self.active_with(&key)
    }

    pub fn directory(&self) -> &std::path::Path {
        &self.options.directory
    }
}

/// Execute a command.
pub fn execute(command: Command, global: Global) -> Result<()> {
    use Command::*;

    // Commands that do not touch environment files.
    match &command {
        GenerateKey => return keys::generate(),
        Completions { shell } => return completions::execute(shell.clone()),
        _ => {}
    }

    let ctx = Context::new(&global)?;

    match command {
        Create { name } => create::execute(&ctx, &name),
        Add { name, value, force } => vars::add(&ctx, &name, value, force),
        Remove { name } => vars::remove(&ctx, &name),
        Show { name, json } => vars::show(&ctx, name.as_deref(), json),
        List => inventory::list(&ctx),
        Check { strict } => inventory::check(&ctx, strict),
        Transcode {
            transcode_key,
            force,
        } => keys::transcode(&ctx, &transcode_key, force),
        Rotate => keys::rotate(&ctx),
        Encrypt { value } => crypt::encrypt(&ctx, &value),
        Decrypt { value } => crypt::decrypt(&ctx, &value),
        Export { output } => env::export(&ctx, output),
        Import { path, force } => env::import(&ctx, &path, force),
        Run { command } => run::execute(&ctx, &command),
        GenerateKey | Completions { .. } => Ok(()),
    }
}
