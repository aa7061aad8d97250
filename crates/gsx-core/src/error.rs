//! Error types and handling for gsx-core operations.
//!
//! Malformed catalog *data* never surfaces here: the parser reports those
//! problems as warnings next to whatever records it could recover. This type
//! covers everything around the catalog pipeline instead: fetching payloads,
//! reading and writing the payload cache, loading configuration, and the
//! search engine itself.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: File system operations, disk access
//! - **Network Errors**: HTTP requests, connectivity issues
//! - **Parse Errors**: Payloads that are not JSON at all
//! - **Index Errors**: Search index construction and querying
//! - **Storage Errors**: Payload cache operations
//! - **Configuration Errors**: Invalid settings or config files
//!
//! ## Categories in logs
//!
//! ```rust
//! use gsx_core::{Error, Result};
//!
//! fn handle(result: Result<()>) {
//!     if let Err(e) = result {
//!         eprintln!("{} failure: {e}", e.category());
//!     }
//! }
//!
//! handle(Err(Error::NotFound("OPS.1".to_string())));
//! ```

use thiserror::Error;

/// The main error type for gsx-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading payload files, writing cache entries, creating
    /// directories.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed, including request timeouts.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A payload could not be decoded.
    ///
    /// Only raised for byte-level problems such as a download that is not
    /// JSON. A JSON document with the wrong shape is *not* an error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Search index operation failed.
    #[error("Index error: {0}")]
    Index(String),

    /// Payload cache operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    ///
    /// Used for HTTP 404 responses, unknown control ids and missing cache
    /// entries that a caller explicitly asked for.
    #[error("Not found: {0}")]
    NotFound(String),

    /// URL is malformed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Serialization or deserialization of an internal format failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tantivy::TantivyError> for Error {
    fn from(err: tantivy::TantivyError) -> Self {
        Self::Index(err.to_string())
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// The catalog loader logs it as the `category` field when a live fetch
    /// fails.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Index(_) => "index",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        let cases = vec![
            (Error::Parse("invalid json".to_string()), "Parse error"),
            (Error::Index("search failed".to_string()), "Index error"),
            (Error::Storage("disk full".to_string()), "Storage error"),
            (Error::Config("missing field".to_string()), "Configuration error"),
            (Error::NotFound("control".to_string()), "Not found"),
            (Error::InvalidUrl("not a url".to_string()), "Invalid URL"),
        ];

        for (error, prefix) in cases {
            let rendered = error.to_string();
            assert!(
                rendered.starts_with(prefix),
                "expected '{rendered}' to start with '{prefix}'"
            );
        }

        assert_eq!(Error::Other("plain".to_string()).to_string(), "plain");
    }

    #[test]
    fn test_error_from_io_error() {
        let error: Error = io::Error::new(io::ErrorKind::NotFound, "file not found").into();
        match error {
            Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
            other => panic!("Expected IO error variant, got {other:?}"),
        }
    }

    #[test]
    fn test_error_from_serde_json() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = err.into();
        assert_eq!(error.category(), "serialization");
    }

    #[test]
    fn test_error_categories() {
        let error_categories = vec![
            (Error::Io(io::Error::other("test")), "io"),
            (Error::Parse("test".to_string()), "parse"),
            (Error::Index("test".to_string()), "index"),
            (Error::Storage("test".to_string()), "storage"),
            (Error::Config("test".to_string()), "config"),
            (Error::NotFound("test".to_string()), "not_found"),
            (Error::InvalidUrl("test".to_string()), "invalid_url"),
            (Error::Serialization("test".to_string()), "serialization"),
            (Error::Other("test".to_string()), "other"),
        ];

        for (error, expected_category) in error_categories {
            assert_eq!(error.category(), expected_category);
        }
    }

    proptest! {
        #[test]
        fn test_parse_error_with_arbitrary_messages(msg in r".{0,500}") {
            let error = Error::Parse(msg.clone());
            let rendered = error.to_string();

            prop_assert!(rendered.contains("Parse error"));
            prop_assert!(rendered.contains(&msg));
            prop_assert_eq!(error.category(), "parse");
        }

        #[test]
        fn test_storage_error_with_arbitrary_messages(msg in r".{0,500}") {
            let error = Error::Storage(msg.clone());
            prop_assert!(error.to_string().contains(&msg));
            prop_assert_eq!(error.category(), "storage");
        }
    }
}
