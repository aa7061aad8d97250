#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Isolated data and config directories for one test
pub struct TestEnv {
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: tempfile::tempdir().expect("failed to create data dir for tests"),
            config_dir: tempfile::tempdir().expect("failed to create config dir for tests"),
        }
    }

    /// A `gsx` command that only sees this environment's directories.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gsx"));
        cmd.timeout(CMD_TIMEOUT);
        cmd.env("GSX_DATA_DIR", self.data_dir.path());
        cmd.env("GSX_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("GSX_CONFIG");
        cmd.env_remove("GSX_CATALOG_URL");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    pub fn write_config(&self, contents: &str) {
        std::fs::write(self.config_dir.path().join("config.toml"), contents).unwrap();
    }
}

/// Path of the bundled sample catalog
#[allow(dead_code)]
pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.json")
}

#[allow(dead_code)]
pub fn fixture_json() -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(fixture_path()).unwrap()).unwrap()
}
