//! Utility functions for the CLI

pub mod logging;
pub mod source;

pub use logging::initialize_logging;
pub use source::{CatalogContext, open_storage, resolve_url};
