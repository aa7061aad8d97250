//! Configuration for gsx.
//!
//! Settings live in a single TOML file. Every key is optional; missing keys
//! take their default, and a missing file means all defaults.
//!
//! ## File Location
//!
//! Resolved in this order:
//!
//! 1. `$GSX_CONFIG` (explicit file)
//! 2. `$GSX_CONFIG_DIR/config.toml`
//! 3. The platform config directory, e.g. `~/.config/gsx/config.toml` on Linux
//!
//! `$GSX_CATALOG_URL` overrides `defaults.catalog_url` after loading.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [defaults]
//! catalog_url = "https://example.org/grundschutz/catalog.json"
//! fetch_timeout_secs = 30
//! result_limit = 50
//! fetch_enabled = true
//!
//! [paths]
//! data_dir = "/home/user/.local/share/gsx"
//! ```
//!
//! ```rust
//! use gsx_core::Config;
//!
//! let config: Config = toml::from_str("[defaults]\nresult_limit = 10\n")?;
//! assert_eq!(config.defaults.result_limit, 10);
//! assert!(config.defaults.fetch_enabled);
//! # Ok::<(), toml::de::Error>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: DefaultsConfig,
    pub paths: PathsConfig,
}

/// Catalog source and query defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Catalog used when a command gets no `--url`.
    ///
    /// There is no built-in default; the catalog has to be named either here,
    /// through `GSX_CATALOG_URL`, or on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_url: Option<String>,

    /// Request timeout for catalog downloads.
    pub fetch_timeout_secs: u64,

    /// Maximum number of search results shown by default.
    pub result_limit: usize,

    /// Whether commands may reach the network at all.
    ///
    /// When disabled, `fetch` fails and everything else reads the cache.
    pub fetch_enabled: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            catalog_url: None,
            fetch_timeout_secs: 30,
            result_limit: 50,
            fetch_enabled: true,
        }
    }
}

impl DefaultsConfig {
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Payload cache root; `None` uses the storage default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(path, content).map_err(|e| Error::Config(format!("Failed to write config: {e}")))
    }

    /// Apply `GSX_CATALOG_URL` as returned by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GSX_CATALOG_URL") {
            let url = url.trim();
            if !url.is_empty() {
                self.defaults.catalog_url = Some(url.to_string());
            }
        }
    }

    /// Path of the configuration file, honoring `GSX_CONFIG` and `GSX_CONFIG_DIR`.
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(file) = std::env::var("GSX_CONFIG") {
            let trimmed = file.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        if let Ok(dir) = std::env::var("GSX_CONFIG_DIR") {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed).join(CONFIG_FILE_NAME));
            }
        }

        let project_dirs = directories::ProjectDirs::from("dev", "gsx", "gsx")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(project_dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.defaults.catalog_url, None);
        assert_eq!(config.defaults.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.defaults.result_limit, 50);
        assert!(config.defaults.fetch_enabled);
        assert_eq!(config.paths.data_dir, None);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[defaults]\ncatalog_url = \"https://example.org/c.json\"\nfetch_enabled = false\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.defaults.catalog_url.as_deref(),
            Some("https://example.org/c.json")
        );
        assert!(!config.defaults.fetch_enabled);
        assert_eq!(config.defaults.result_limit, 50);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[defaults\nbroken").unwrap();
        assert_eq!(Config::load_from(&path).unwrap_err().category(), "config");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.defaults.result_limit = 7;
        config.paths.data_dir = Some(dir.path().join("data"));

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| {
            (key == "GSX_CATALOG_URL").then(|| " https://example.org/env.json ".to_string())
        });
        assert_eq!(
            config.defaults.catalog_url.as_deref(),
            Some("https://example.org/env.json")
        );

        config.apply_env_overrides(|_| Some("   ".to_string()));
        assert_eq!(
            config.defaults.catalog_url.as_deref(),
            Some("https://example.org/env.json")
        );
    }
}
