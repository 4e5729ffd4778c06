//! Test support utilities for envcrypt integration tests.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// An isolated directory of environment files.
///
/// Child processes run with `.current_dir()` and an explicit `--key`, so
/// tests never touch process-global state and can run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Path of `<name>.env` inside the test directory.
    pub fn env_file(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{}.env", name))
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create an environment through the binary and return its key.
    pub fn create(&self, name: &str) -> String {
        let output = self.create_cmd(name);
        assert_success(&output);
        key_from(&output)
    }

    /// Create an environment and fill it with `vars`.
    pub fn with_vars(&self, name: &str, vars: &[(&str, &str)]) -> String {
        let key = self.create(name);
        for (k, v) in vars {
            assert_success(&self.add(&key, k, v));
        }
        key
    }
}

/// Pull the key out of `create` or `rotate` output.
pub fn key_from(output: &std::process::Output) -> String {
    stdout(output)
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("key "))
        .map(|k| k.trim().to_string())
        .expect("no key line in output")
}
