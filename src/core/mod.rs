//! Core library components.
//!
//! Encrypted environment files, key handling and the resolution of the
//! active environment. Nothing in here prints; the CLI does that.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod encrypter;
pub mod env;
pub mod level;
pub mod state;
pub mod state_list;
pub mod types;
pub mod validation;
