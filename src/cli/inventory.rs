//! Inventory commands: list and check.

use crate::cli::{output, Context};
use crate::error::Result;

/// List every candidate environment.
pub fn list(ctx: &Context) -> Result<()> {
    let list = ctx.list()?;

    if list.is_empty() {
        output::dimmed("no environments found");
        output::hint("create one with: envcrypt create <name>");
        return Ok(());
    }

    output::header("Environments");
    output::rule();
    for (index, state) in list.states().iter().enumerate() {
        let status = if Some(index) == list.active_index() {
            "active".to_string()
        } else if state.is_decrypted() {
            "unlocked".to_string()
        } else {
            output::locked("locked")
        };

        output::kv(
            &format!("{:<16}", state.name()),
            format!("{:<10} {} variables", status, state.len()),
        );
    }
    Ok(())
}

/// Check that unlocked environments define the same variables.
///
/// Drift is logged by the library; the report itself goes to stdout.
pub fn check(ctx: &Context, strict: bool) -> Result<()> {
    let list = ctx.list()?;
    let report = list.check_variables(strict)?;

    let unlocked = list.states().iter().filter(|s| s.is_decrypted()).count();
    if report.is_empty() {
        output::success(&format!(
            "{} unlocked environment(s) define the same variables",
            unlocked
        ));
        return Ok(());
    }

    output::header("Missing variables");
    for missing in &report {
        output::list_item(&format!(
            "{} missing in {}",
            output::key(&missing.name),
            missing.states.join(", ")
        ));
    }
    Ok(())
}
