//! Run command.
//!
//! Executes a command with the active environment's variables set,
//! `SECRET_KEY` included.

use std::process::Command;

use tracing::debug;

use crate::cli::Context;
use crate::core::level::Resolved;
use crate::error::{Error, Result};

/// Run `command` and exit with its status.
pub fn execute(ctx: &Context, command: &[String]) -> Result<()> {
    let list = ctx.resolve()?;
    let resolved = Resolved::<String>::from_list(&list)?;
    let code = run_with(&resolved, command)?;
    std::process::exit(code);
}

fn run_with(resolved: &Resolved<String>, command: &[String]) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        return Err(Error::Other("no command specified".to_string()));
    };

    let mut cmd = Command::new(program);
    cmd.args(args);
    resolved.apply(|name, value| {
        cmd.env(name, value);
    });

    debug!(environment = resolved.name(), program = %program, "spawning");
    let status = cmd.status()?;

    // A signal-terminated child has no code.
    Ok(status.code().unwrap_or(1))
}
