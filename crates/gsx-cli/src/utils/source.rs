//! Catalog source resolution shared by the reading commands.

use anyhow::{Context, Result, anyhow};
use gsx_core::{
    CatalogLoader, CatalogSession, Config, Fetcher, LoadedCatalog, Storage, load_file,
};
use std::path::Path;
use tracing::debug;

use crate::cli::SourceArgs;

/// Open the payload cache.
///
/// `GSX_DATA_DIR` wins over `paths.data_dir` from the config file.
pub fn open_storage(config: &Config) -> Result<Storage> {
    let storage = match &config.paths.data_dir {
        Some(dir) if std::env::var_os("GSX_DATA_DIR").is_none() => Storage::with_root(dir.clone()),
        _ => Storage::new(),
    };
    storage.context("Failed to open catalog cache")
}

/// The catalog URL to use: `explicit`, else the configured default.
pub fn resolve_url(explicit: Option<&str>, config: &Config) -> Result<String> {
    explicit
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(ToString::to_string)
        .or_else(|| config.defaults.catalog_url.clone())
        .ok_or_else(|| {
            anyhow!(
                "No catalog URL configured. Pass --url, set GSX_CATALOG_URL, or set \
                 defaults.catalog_url in the config file"
            )
        })
}

/// Loaded configuration plus the collaborators built from it
#[derive(Debug)]
pub struct CatalogContext {
    pub config: Config,
}

impl CatalogContext {
    /// Load configuration from `path`, or the default location.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                let mut config = Config::load_from(path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?;
                config.apply_env_overrides(|key| std::env::var(key).ok());
                config
            },
            None => Config::load().context("Failed to load config")?,
        };
        Ok(Self { config })
    }

    pub fn loader(&self) -> Result<CatalogLoader<Storage>> {
        let fetcher = Fetcher::with_timeout(self.config.defaults.fetch_timeout())
            .context("Failed to create HTTP client")?;
        Ok(CatalogLoader::new(fetcher, open_storage(&self.config)?))
    }

    /// Parse the catalog named by `source` without touching the network.
    pub fn load_catalog(&self, source: &SourceArgs) -> Result<LoadedCatalog> {
        if let Some(file) = &source.file {
            debug!("Reading catalog from {}", file.display());
            return load_file(file)
                .with_context(|| format!("Failed to read catalog file {}", file.display()));
        }

        let url = resolve_url(source.url.as_deref(), &self.config)?;
        debug!("Reading cached catalog for {url}");
        Ok(self.loader()?.load_cached(&url)?)
    }

    /// Parse and index the catalog named by `source`.
    pub fn open_session(&self, source: &SourceArgs) -> Result<CatalogSession> {
        let loaded = self.load_catalog(source)?;
        CatalogSession::new(loaded.outcome).context("Failed to build search index")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config_with_url(url: Option<&str>) -> Config {
        let mut config = Config::default();
        config.defaults.catalog_url = url.map(ToString::to_string);
        config
    }

    #[test]
    fn test_explicit_url_wins() {
        let config = config_with_url(Some("https://example.org/default.json"));
        assert_eq!(
            resolve_url(Some("https://example.org/other.json"), &config).unwrap(),
            "https://example.org/other.json"
        );
        assert_eq!(
            resolve_url(Some("  "), &config).unwrap(),
            "https://example.org/default.json"
        );
    }

    #[test]
    fn test_missing_url_is_error() {
        let err = resolve_url(None, &config_with_url(None)).unwrap_err();
        assert!(err.to_string().contains("No catalog URL configured"));
    }

    #[test]
    fn test_file_source_skips_url_resolution() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("catalog.json");
        std::fs::write(&file, r#"{"catalog": {"controls": [{"id": "A", "title": "Alpha"}]}}"#)
            .unwrap();

        let context = CatalogContext {
            config: Config::default(),
        };
        let source = SourceArgs {
            url: None,
            file: Some(file),
        };
        let session = context.open_session(&source).unwrap();
        assert_eq!(session.records().len(), 1);
        assert!(session.warnings().is_empty());
    }
}
