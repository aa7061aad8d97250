//! # Output Formatting
//!
//! Every command that prints data supports three formats:
//!
//! - **Text**: colored, human-readable output
//! - **JSON**: one pretty-printed document
//! - **NDJSON**: one compact JSON object per line, for streaming into `jq`
//!
//! ```bash
//! gsx search firewall --format json | jq '.results[].id'
//! gsx diff old.json new.json --format ndjson | jq -c 'select(.status == "added")'
//! ```
//!
//! Text renderers return strings so commands decide where they go; JSON
//! renderers print to stdout directly.

mod formatter;
mod json;
mod progress;
mod text;

pub use formatter::{OutputFormat, SearchReport, SearchResultFormatter, SearchRow};
pub use json::JsonFormatter;
pub use progress::spinner;
pub use text::TextFormatter;
