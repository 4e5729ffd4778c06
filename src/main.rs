//! Envcrypt - per-environment encrypted configuration.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use envcrypt::cli::output;
use envcrypt::cli::{execute, Cli};
use envcrypt::error::{CipherError, ConfigError, Error, ResolveError, StateError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("ENVCRYPT_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("envcrypt=debug")
        } else {
            EnvFilter::new("envcrypt=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.global) {
        output::error(&e.to_string());
        if let Some(hint) = hint(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

fn hint(e: &Error) -> Option<&'static str> {
    match e {
        Error::Resolve(ResolveError::EnvKeyNotFound(_)) => Some("pass --key or export KEY"),
        Error::Resolve(ResolveError::NoEnvironments(_)) => {
            Some("run: envcrypt create <name>")
        }
        Error::Resolve(ResolveError::DeploymentLevelNotFound) => {
            Some("check the key, or run: envcrypt list")
        }
        Error::Resolve(ResolveError::Ambiguous(_)) => {
            Some("give each environment its own key, or narrow --pattern")
        }
        Error::Resolve(ResolveError::VariableMissing(_)) => {
            Some("add the missing variables, or drop --strict")
        }
        Error::Cipher(CipherError::InvalidKey) => Some("generate one with: envcrypt generate-key"),
        Error::State(StateError::AlreadyExists(_)) => Some("pick another name"),
        Error::Config(ConfigError::Parse(_) | ConfigError::InvalidValue { .. }) => {
            Some("fix .envcrypt.toml")
        }
        _ => None,
    }
}
