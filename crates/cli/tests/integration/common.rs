//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the variables store.
pub struct TestEnv {
  pub temp: TempDir,
  pub store_path: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let store_path = temp.path().join("vars.yml");
    Self { temp, store_path }
  }

  /// Write the store file directly.
  pub fn write_store(&self, content: &str) {
    std::fs::write(&self.store_path, content).unwrap();
  }

  pub fn read_store(&self) -> String {
    std::fs::read_to_string(&self.store_path).unwrap()
  }

  /// Parsed store file.
  pub fn store(&self) -> serde_yaml::Mapping {
    serde_yaml::from_str(&self.read_store()).unwrap()
  }

  /// Get a Command for the credforge binary with the store and definitions
  /// environment cleared, so only explicit flags apply.
  pub fn credforge_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("credforge");
    cmd.env_remove("CREDFORGE_DEF_FILE");
    cmd.env_remove("CREDFORGE_VAR_STORE");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `credforge generate` against a fixture.
  pub fn generate(&self, fixture: &str) -> Command {
    let mut cmd = self.credforge_cmd();
    cmd
      .arg("generate")
      .arg("-d")
      .arg(fixture_path(fixture))
      .arg("-s")
      .arg(&self.store_path);
    cmd
  }
}
