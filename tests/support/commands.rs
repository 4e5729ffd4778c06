//! Command helper methods for Test.

use std::process::Output;

use assert_cmd::Command;

use super::Test;

impl Test {
    /// An envcrypt command rooted in the test directory.
    ///
    /// `KEY` is cleared so only an explicit `--key` resolves anything, and
    /// colors are off so output can be matched literally.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("envcrypt").expect("failed to find envcrypt binary");
        cmd.env_remove("KEY");
        cmd.env_remove("ENVCRYPT_LOG");
        cmd.env_remove("ENVCRYPT_DIR");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// A command carrying `--key`.
    pub fn keyed(&self, key: &str) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["--key", key]);
        cmd
    }

    pub fn create_cmd(&self, name: &str) -> Output {
        self.cmd()
            .args(["create", name])
            .output()
            .expect("failed to run envcrypt create")
    }

    pub fn add(&self, key: &str, name: &str, value: &str) -> Output {
        self.keyed(key)
            .args(["add", name, value])
            .output()
            .expect("failed to run envcrypt add")
    }

    pub fn add_force(&self, key: &str, name: &str, value: &str) -> Output {
        self.keyed(key)
            .args(["add", name, value, "--force"])
            .output()
            .expect("failed to run envcrypt add --force")
    }

    pub fn remove(&self, key: &str, name: &str) -> Output {
        self.keyed(key)
            .args(["remove", name])
            .output()
            .expect("failed to run envcrypt remove")
    }

    /// `show --name`, which prints the raw value.
    pub fn get(&self, key: &str, name: &str) -> Output {
        self.keyed(key)
            .args(["show", "--name", name])
            .output()
            .expect("failed to run envcrypt show --name")
    }

    pub fn show_json(&self, key: &str) -> Output {
        self.keyed(key)
            .args(["show", "--json"])
            .output()
            .expect("failed to run envcrypt show --json")
    }

    pub fn list(&self, key: &str) -> Output {
        self.keyed(key)
            .arg("list")
            .output()
            .expect("failed to run envcrypt list")
    }
}
