//! Key commands: generate-key, rotate, transcode.

use tracing::info;

use crate::cli::{output, Context};
use crate::core::encrypter::Encrypter;
use crate::error::Result;

/// Print a fresh key on stdout.
pub fn generate() -> Result<()> {
    println!("{}", Encrypter::generate_key().as_str());
    Ok(())
}

/// Re-encrypt the active environment under a new key.
pub fn rotate(ctx: &Context) -> Result<()> {
    let mut state = ctx.active()?;
    let old = state.fingerprint().unwrap_or_default();

    let key = state.rekey()?;
    info!(environment = state.name(), "rotated key");

    output::success(&format!("rotated key for {}", output::key(state.name())));
    output::kv("key", key.as_str());
    output::kv("fingerprint", format!("{} -> {}", old, state.fingerprint().unwrap_or_default()));
    output::warn("the previous key no longer opens this environment");
    Ok(())
}

/// Copy the active environment's variables into the one `target_key` opens.
pub fn transcode(ctx: &Context, target_key: &str, force: bool) -> Result<()> {
    let source = ctx.active()?;
    let mut target = ctx.active_with(target_key)?;

    if source.path() == target.path() {
        output::warn("both keys open the same environment; nothing to do");
        return Ok(());
    }

    let copied = target.transcode_from(&source, force)?;
    target.save()?;

    output::success(&format!(
        "copied {} variable(s) from {} to {}",
        copied.len(),
        output::key(source.name()),
        output::key(target.name())
    ));
    for name in &copied {
        output::list_item(name);
    }
    Ok(())
}
