//! Envcrypt - per-environment encrypted configuration.
//!
//! Every deployment environment lives in its own `<name>.env` JSON file
//! whose values are individually encrypted with a Fernet key. Whichever
//! file the caller's key unlocks is the active environment.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── create        # New environment files
//! │   ├── vars          # add / remove / show
//! │   ├── inventory     # list / check
//! │   ├── keys          # generate-key / rotate / transcode
//! │   ├── crypt         # encrypt / decrypt single values
//! │   ├── env           # .env import / export
//! │   └── run           # Run with injected variables
//! └── core/             # Core library components
//!     ├── cipher/       # Cipher trait + fernet backend
//!     ├── encrypter     # One key bound to the cipher
//!     ├── state/        # One encrypted environment file
//!     ├── state_list    # Active environment resolution
//!     ├── level         # Deployment levels
//!     ├── config        # .envcrypt.toml
//!     └── env           # .env file operations
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::encrypter::Encrypter;
pub use crate::core::level::{Deployment, Resolved};
pub use crate::core::state::{LoadMode, State};
pub use crate::core::state_list::{MissingVariable, StateList, StateListOptions};
