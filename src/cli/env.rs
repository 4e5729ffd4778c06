//! Dotenv import and export.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::{output, Context};
use crate::core::constants;
use crate::core::env::Env;
use crate::core::level::Resolved;
use crate::error::{Result, StateError};

/// Write the active environment as `KEY=value` lines.
pub fn export(ctx: &Context, destination: Option<PathBuf>) -> Result<()> {
    let list = ctx.resolve()?;
    let resolved = Resolved::<String>::from_list(&list)?;
    let path = destination.clone().unwrap_or_else(|| PathBuf::from("-"));
    let env = resolved.to_env(path);

    match destination {
        Some(_) => {
            env.save()?;
            info!(environment = resolved.name(), path = %env.path().display(), "exported");
            output::success(&format!(
                "exported {} variable(s) to {}",
                env.len(),
                output::path(env.path().display())
            ));
        }
        None => print!("{}", env),
    }
    Ok(())
}

/// Add every pair of a dotenv file to the active environment.
///
/// A `SECRET_KEY` line is skipped; each environment keeps its own.
pub fn import(ctx: &Context, path: &Path, force: bool) -> Result<()> {
    let mut state = ctx.active()?;
    let env = Env::load(path)?;

    let incoming: Vec<&(String, String)> = env
        .entries()
        .iter()
        .filter(|(k, _)| !k.eq_ignore_ascii_case(constants::SECRET_KEY))
        .collect();

    if !force {
        if let Some((k, _)) = incoming.iter().find(|(k, _)| state.contains(k)) {
            return Err(StateError::VariableExists(k.to_ascii_uppercase()).into());
        }
    }

    for (k, v) in &incoming {
        state.add(k, v, force)?;
    }
    state.save()?;

    output::success(&format!(
        "imported {} variable(s) into {}",
        incoming.len(),
        output::key(state.name())
    ));
    Ok(())
}
