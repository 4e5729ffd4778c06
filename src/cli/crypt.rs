//! Encrypt and decrypt single values with the caller's key.

use crate::cli::Context;
use crate::core::encrypter::Encrypter;
use crate::error::Result;

pub fn encrypt(ctx: &Context, value: &str) -> Result<()> {
    let encrypter = Encrypter::new(&ctx.key()?)?;
    println!("{}", encrypter.encrypt(value)?);
    Ok(())
}

pub fn decrypt(ctx: &Context, value: &str) -> Result<()> {
    let encrypter = Encrypter::new(&ctx.key()?)?;
    println!("{}", encrypter.decrypt(value.trim())?);
    Ok(())
}
