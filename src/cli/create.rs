//! Create command.
//!
//! Writes a new environment file and prints its key once.

use tracing::info;

use crate::cli::{output, Context};
use crate::core::state::State;
use crate::error::Result;

/// Create `<dir>/<name>.env` under a fresh key.
pub fn execute(ctx: &Context, name: &str) -> Result<()> {
    info!(environment = name, "creating environment");

    let (state, key) = State::create(ctx.directory(), name)?;

    output::success(&format!(
        "created {} at {}",
        output::key(state.name()),
        output::path(state.path().display())
    ));
    output::kv("key", key.as_str());
    output::kv("fingerprint", state.fingerprint().unwrap_or_default());
    println!();
    output::warn("save this key now; it is not stored anywhere and cannot be recovered");
    output::hint(&format!("export KEY='{}'", key.as_str()));

    Ok(())
}
