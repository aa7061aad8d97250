//! Command implementations for the gsx CLI

mod cache;
mod completions;
mod config;
mod diff;
mod export;
mod fetch;
mod groups;
mod search;
mod show;

pub use cache::{clear_cache, list_cache};
pub use completions::generate;
pub use config::run_config;
pub use diff::show_diff;
pub use export::{ExportRequest, export_controls};
pub use fetch::fetch_catalog;
pub use groups::list_groups;
pub use search::{SearchRequest, search};
pub use show::show_control;

use colored::Colorize;

use crate::output::{OutputFormat, TextFormatter};

/// Print parse warnings to stderr for text output.
///
/// Machine formats carry warnings in their payload instead.
fn report_warnings(warnings: &[String], format: OutputFormat, quiet: bool) {
    if warnings.is_empty() || quiet || format.is_machine() {
        return;
    }
    eprint!("{}", TextFormatter::warnings(warnings));
}

/// Hint printed when a catalog holds no controls at all
fn report_empty_catalog(format: OutputFormat) {
    if !format.is_machine() {
        eprintln!(
            "{} No controls loaded. Run 'gsx fetch' or check the catalog source",
            "ℹ".blue()
        );
    }
}
