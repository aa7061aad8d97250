//! Fetch-with-fallback loading of catalogs.
//!
//! A live fetch replaces the cached payload only when it yields controls.
//! When the live path fails for any reason, the cached payload for the same
//! URL is parsed instead and the failure is reported next to it.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::fetcher::Fetcher;
use crate::parser::CatalogParser;
use crate::storage::CatalogCache;
use crate::types::ParseOutcome;
use crate::{Error, Result};

/// Warning appended when cached data stands in for a failed live fetch.
pub const CACHED_FALLBACK_WARNING: &str = "Live fetch failed; loaded cached copy.";

const NO_CONTROLS: &str = "Catalog parsed but no controls were found.";

/// Where a loaded payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Live,
    Cached,
    File,
}

/// A parsed catalog plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedCatalog {
    pub outcome: ParseOutcome,
    pub origin: Origin,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Live failure that forced a cached fallback
    pub error: Option<String>,
}

/// Loads catalogs from the network with a payload cache as fallback.
#[derive(Debug)]
pub struct CatalogLoader<C: CatalogCache> {
    fetcher: Fetcher,
    cache: C,
    parser: CatalogParser,
}

impl<C: CatalogCache> CatalogLoader<C> {
    pub fn new(fetcher: Fetcher, cache: C) -> Self {
        Self::with_parser(fetcher, cache, CatalogParser::new())
    }

    pub fn with_parser(fetcher: Fetcher, cache: C, parser: CatalogParser) -> Self {
        Self {
            fetcher,
            cache,
            parser,
        }
    }

    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// Fetch and parse `url`, falling back to the cached payload on failure.
    ///
    /// Fails only when the live path fails and nothing usable is cached.
    pub async fn load_live(&self, url: &str) -> Result<LoadedCatalog> {
        let live_error = match self.fetch_and_parse(url).await {
            Ok(loaded) => return Ok(loaded),
            Err(err) => err,
        };
        warn!(
            category = live_error.category(),
            "Live fetch of {url} failed: {live_error}"
        );

        let cached = match self.cache.load(url) {
            Ok(Some(cached)) => cached,
            Ok(None) => return Err(live_error),
            Err(cache_error) => {
                warn!("Cache lookup for {url} failed: {cache_error}");
                return Err(live_error);
            },
        };

        let mut outcome = self.parser.parse(&cached.payload);
        outcome.warnings.push(CACHED_FALLBACK_WARNING.to_string());
        info!(
            "Loaded {} controls from cached copy of {url}",
            outcome.controls.len()
        );

        Ok(LoadedCatalog {
            outcome,
            origin: Origin::Cached,
            fetched_at: Some(cached.fetched_at),
            error: Some(live_error.to_string()),
        })
    }

    /// Parse the cached payload for `url` without touching the network.
    pub fn load_cached(&self, url: &str) -> Result<LoadedCatalog> {
        let cached = self.cache.load(url)?.ok_or_else(|| {
            Error::NotFound(format!("No cached catalog for '{url}'. Run 'gsx fetch' first"))
        })?;
        Ok(LoadedCatalog {
            outcome: self.parser.parse(&cached.payload),
            origin: Origin::Cached,
            fetched_at: Some(cached.fetched_at),
            error: None,
        })
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<LoadedCatalog> {
        let fetched = self.fetcher.fetch_catalog(url).await?;
        let outcome = self.parser.parse(&fetched.payload);
        if outcome.controls.is_empty() {
            return Err(Error::Other(NO_CONTROLS.to_string()));
        }

        let fetched_at = match self.cache.save(url, &fetched.payload) {
            Ok(entry) => entry.fetched_at,
            Err(err) => {
                warn!("Unable to cache catalog: {err}");
                Utc::now()
            },
        };

        info!("Loaded {} controls from {url}", outcome.controls.len());
        Ok(LoadedCatalog {
            outcome,
            origin: Origin::Live,
            fetched_at: Some(fetched_at),
            error: None,
        })
    }
}

/// Parse a payload file from disk.
///
/// Undecodable JSON becomes a warning like any other malformed input; only
/// failing to read the file is an error.
pub fn load_file(path: &Path) -> Result<LoadedCatalog> {
    load_file_with(&CatalogParser::new(), path)
}

/// [`load_file`] with a caller supplied parser.
pub fn load_file_with(parser: &CatalogParser, path: &Path) -> Result<LoadedCatalog> {
    let text = std::fs::read_to_string(path)?;
    Ok(LoadedCatalog {
        outcome: parser.parse_str(&text),
        origin: Origin::File,
        fetched_at: None,
        error: None,
    })
}
