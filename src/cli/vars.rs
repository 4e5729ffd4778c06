//! Variable commands: add, remove, show.

use std::io::{self, IsTerminal, Read};

use dialoguer::{Confirm, Password};
use tracing::info;

use crate::cli::{output, Context};
use crate::core::constants;
use crate::error::{Result, StateError};

/// Add a variable to the active environment.
///
/// Without a value argument the value is read from piped stdin, or
/// prompted for with hidden input on a terminal.
pub fn add(ctx: &Context, name: &str, value: Option<String>, force: bool) -> Result<()> {
    let mut state = ctx.active()?;
    info!(environment = state.name(), variable = name, "adding variable");

    let value = match value {
        Some(v) => v,
        None => read_value(name)?,
    };

    let force = force || (state.contains(name) && confirm_overwrite(name)?);
    state.add(name, &value, force)?;
    state.save()?;

    output::success(&format!(
        "set {} in {}",
        output::key(&name.trim().to_ascii_uppercase()),
        output::key(state.name())
    ));
    Ok(())
}

/// Remove a variable from the active environment.
pub fn remove(ctx: &Context, name: &str) -> Result<()> {
    let mut state = ctx.active()?;
    info!(environment = state.name(), variable = name, "removing variable");

    state.remove(name)?;
    state.save()?;

    output::success(&format!(
        "removed {} from {}",
        output::key(&name.trim().to_ascii_uppercase()),
        output::key(state.name())
    ));
    Ok(())
}

/// Show one variable raw, or every pair of the active environment.
pub fn show(ctx: &Context, name: Option<&str>, json: bool) -> Result<()> {
    let state = ctx.active()?;

    if let Some(name) = name {
        let wanted = name.trim().to_ascii_uppercase();
        let value = state
            .iter()
            .find(|(k, _)| *k == wanted)
            .and_then(|(_, v)| v)
            .ok_or(StateError::VariableNotFound(wanted.clone()))?;

        if json {
            let mut map = serde_json::Map::new();
            map.insert(wanted, value.into());
            println!("{}", serde_json::to_string_pretty(&map)?);
        } else {
            println!("{}", value);
        }
        return Ok(());
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = state
            .iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.into())))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    output::header(&format!("Environment {}", output::key(state.name())));
    output::rule();
    for (k, v) in &state {
        if k == constants::SECRET_KEY {
            output::kv(k, output::locked("(hidden, use --name SECRET_KEY)"));
        } else {
            output::kv(k, v.unwrap_or_default());
        }
    }
    if state.is_empty() {
        output::dimmed("no variables yet");
    }
    Ok(())
}

fn read_value(name: &str) -> Result<String> {
    if io::stdin().is_terminal() {
        let value = Password::new()
            .with_prompt(format!("Value for {}", output::key(name)))
            .allow_empty_password(true)
            .interact()?;
        return Ok(value);
    }

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm_overwrite(name: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    output::warn(&format!("{} already exists", output::key(name)));
    Ok(Confirm::new()
        .with_prompt("Overwrite?")
        .default(false)
        .interact()?)
}
