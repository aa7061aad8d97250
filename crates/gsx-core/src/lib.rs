//! # gsx-core
//!
//! Core functionality for gsx - local search over security-control catalogs
//! published as OSCAL-shaped JSON.
//!
//! A catalog payload is a tree of groups and controls. This crate flattens
//! that tree into searchable [`ControlRecord`]s, indexes them for fuzzy and
//! prefix search, compares two record sets, and renders subsets as CSV or
//! Markdown.
//!
//! ## Architecture
//!
//! - **Parsing**: tolerant flattening of arbitrary payloads, with warnings
//!   instead of errors for malformed data
//! - **Extraction**: the searchable text of a control, plus display helpers
//! - **Index**: an in-memory Tantivy index rebuilt for every record set
//! - **Diff** and **Export**: pure functions over record slices
//! - **Fetcher**, **Storage**, **Loader**: the I/O boundary for downloading
//!   payloads and caching them on disk
//!
//! ## Quick Start
//!
//! ```rust
//! use gsx_core::{CatalogSession, SearchFilters, parse_catalog};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "catalog": {
//!         "groups": [{
//!             "title": "Operations",
//!             "controls": [{"id": "OPS.1", "title": "Nightly backups"}]
//!         }]
//!     }
//! });
//!
//! let session = CatalogSession::new(parse_catalog(&payload))?;
//! let hits = session.search("backup", &SearchFilters::default())?;
//! assert_eq!(hits[0].record.id, "OPS.1");
//! assert_eq!(hits[0].record.group_path, vec!["Operations".to_string()]);
//! # Ok::<(), gsx_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Malformed catalogs never produce an [`Error`]; the parser reports them
//! through [`ParseOutcome::warnings`]. Errors are reserved for I/O, network,
//! configuration and index failures:
//!
//! ```rust
//! use gsx_core::parse_catalog_str;
//!
//! let outcome = parse_catalog_str("{}");
//! assert!(outcome.controls.is_empty());
//! assert!(outcome.warnings[0].contains("Missing \"catalog\""));
//! ```

/// Configuration file handling
pub mod config;
/// Record set comparison
pub mod diff;
/// Error types and result aliases
pub mod error;
/// CSV and Markdown export
pub mod export;
/// Searchable text and display helpers
pub mod extract;
/// HTTP download of catalog payloads
pub mod fetcher;
/// Search index implementation using Tantivy
pub mod index;
/// Fetch-with-fallback loading
pub mod loader;
/// Catalog flattening
pub mod parser;
/// Payload cache
pub mod storage;
/// Catalog model and record types
pub mod types;

// Re-export commonly used types
pub use config::{Config, DefaultsConfig, PathsConfig};
pub use diff::{ChangeStatus, ChangedField, ControlChange, DiffSummary, diff, summarize};
pub use error::{Error, Result};
pub use export::{export_csv, export_csv_with_delimiter, export_markdown};
pub use extract::{ControlDetail, collect_text, preview};
pub use fetcher::{FetchedCatalog, Fetcher};
pub use index::{CatalogSession, RankedRecord, SearchFilters, SearchHit, SearchIndex};
pub use loader::{CatalogLoader, LoadedCatalog, Origin, load_file};
pub use parser::{
    CatalogParser, IdSource, RandomIdSource, SequentialIdSource, parse_catalog,
    parse_catalog_str,
};
pub use storage::{CachedCatalog, CatalogCache, MemoryCache, Storage};
pub use types::*;
