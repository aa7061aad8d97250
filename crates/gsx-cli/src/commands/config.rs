//! `gsx config`: read and change settings in the configuration file

use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;
use gsx_core::Config;
use gsx_core::fetcher::validate_url;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::ConfigCommands;
use crate::output::{JsonFormatter, OutputFormat};
use crate::utils::CatalogContext;

/// Settings addressable as `section.name`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    CatalogUrl,
    FetchTimeoutSecs,
    ResultLimit,
    FetchEnabled,
    DataDir,
}

impl ConfigKey {
    const ALL: [Self; 5] = [
        Self::CatalogUrl,
        Self::FetchTimeoutSecs,
        Self::ResultLimit,
        Self::FetchEnabled,
        Self::DataDir,
    ];

    fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|key| key.as_str()).collect();
                anyhow!(
                    "Unknown configuration key '{raw}'. Known keys: {}",
                    known.join(", ")
                )
            })
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::CatalogUrl => "defaults.catalog_url",
            Self::FetchTimeoutSecs => "defaults.fetch_timeout_secs",
            Self::ResultLimit => "defaults.result_limit",
            Self::FetchEnabled => "defaults.fetch_enabled",
            Self::DataDir => "paths.data_dir",
        }
    }

    fn get(self, config: &Config) -> Option<String> {
        match self {
            Self::CatalogUrl => config.defaults.catalog_url.clone(),
            Self::FetchTimeoutSecs => Some(config.defaults.fetch_timeout_secs.to_string()),
            Self::ResultLimit => Some(config.defaults.result_limit.to_string()),
            Self::FetchEnabled => Some(config.defaults.fetch_enabled.to_string()),
            Self::DataDir => config
                .paths
                .data_dir
                .as_ref()
                .map(|dir| dir.display().to_string()),
        }
    }

    /// An empty value clears the optional settings.
    fn set(self, config: &mut Config, raw: &str) -> Result<()> {
        let value = raw.trim();
        match self {
            Self::CatalogUrl => {
                config.defaults.catalog_url = if value.is_empty() {
                    None
                } else {
                    validate_url(value)?;
                    Some(value.to_string())
                };
            },
            Self::FetchTimeoutSecs => {
                config.defaults.fetch_timeout_secs = parse_positive(self, value)?;
            },
            Self::ResultLimit => {
                config.defaults.result_limit = usize::try_from(parse_positive(self, value)?)?;
            },
            Self::FetchEnabled => config.defaults.fetch_enabled = parse_bool(value)?,
            Self::DataDir => {
                config.paths.data_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            },
        }
        Ok(())
    }
}

fn parse_positive(key: ConfigKey, raw: &str) -> Result<u64> {
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => bail!("{} expects a positive whole number, got '{raw}'", key.as_str()),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected boolean value, got '{other}'")),
    }
}

/// One setting as printed by `gsx config get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: Option<String>,
}

fn entries(config: &Config, key: Option<ConfigKey>) -> Vec<ConfigEntry> {
    let keys: Vec<ConfigKey> = key.map_or_else(|| ConfigKey::ALL.to_vec(), |key| vec![key]);
    keys.into_iter()
        .map(|key| ConfigEntry {
            key: key.as_str(),
            value: key.get(config),
        })
        .collect()
}

/// The file `gsx config set` writes to.
fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_path().context("Failed to locate config file"),
    }
}

/// Change one setting in the file at `path` and write it back.
///
/// Environment overrides are not applied, so `GSX_CATALOG_URL` never ends up
/// in the file.
fn update_file(path: &Path, key: ConfigKey, value: &str) -> Result<Config> {
    let mut config = Config::load_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    key.set(&mut config, value)?;
    config
        .save_to(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(config)
}

/// Dispatch a `gsx config` subcommand.
///
/// # Errors
///
/// Returns an error for unknown keys, invalid values, or an unreadable or
/// unwritable config file.
pub fn run_config(explicit: Option<&Path>, command: ConfigCommands, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Get { key, format } => {
            let key = key.as_deref().map(ConfigKey::parse).transpose()?;
            let config = CatalogContext::new(explicit)?.config;
            print_entries(&entries(&config, key), key.is_some(), format)
        },
        ConfigCommands::Set { key, value } => {
            let key = ConfigKey::parse(&key)?;
            let path = config_file(explicit)?;
            let config = update_file(&path, key, &value)?;
            if !quiet {
                let shown = key.get(&config).unwrap_or_else(|| "(not set)".to_string());
                println!(
                    "{} Set {} = {shown} in {}",
                    "✓".green(),
                    key.as_str(),
                    path.display()
                );
            }
            Ok(())
        },
        ConfigCommands::Path => {
            println!("{}", config_file(explicit)?.display());
            Ok(())
        },
    }
}

fn print_entries(entries: &[ConfigEntry], single: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text if single => {
            for entry in entries {
                println!("{}", entry.value.as_deref().unwrap_or_default());
            }
        },
        OutputFormat::Text => {
            for entry in entries {
                let value = entry.value.as_deref().unwrap_or("(not set)");
                println!("{} = {value}", entry.key.bold());
            }
        },
        OutputFormat::Json if single => {
            if let Some(entry) = entries.first() {
                JsonFormatter::print(entry)?;
            }
        },
        OutputFormat::Json => JsonFormatter::print(entries)?,
        OutputFormat::Ndjson => JsonFormatter::print_lines(entries)?,
    }
    Ok(())
}
