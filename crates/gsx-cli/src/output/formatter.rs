//! # Output Formatting Abstractions
//!
//! [`OutputFormat`] is selected on the command line through clap's
//! `ValueEnum` derive. [`SearchResultFormatter`] dispatches a
//! [`SearchReport`] to the text or JSON renderer.

use anyhow::Result;
use gsx_core::{RankedRecord, extract};
use serde::Serialize;

use super::{json::JsonFormatter, text::TextFormatter};

/// Output format options supported by the CLI
///
/// - **Text**: colored output for terminals
/// - **Json**: a single pretty-printed document
/// - **Ndjson**: one compact JSON object per line
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// Pretty-printed JSON
    Json,
    /// Newline-delimited JSON
    Ndjson,
}

impl OutputFormat {
    /// True for formats meant for other programs
    pub const fn is_machine(self) -> bool {
        matches!(self, Self::Json | Self::Ndjson)
    }
}

/// One search result as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRow<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub group_path: &'a [String],
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<&'a str>,
    pub preview: String,
}

impl<'a> SearchRow<'a> {
    pub fn from_ranked(hit: &RankedRecord<'a>) -> Self {
        let record = hit.record;
        Self {
            id: &record.id,
            title: &record.title,
            group_path: &record.group_path,
            score: hit.score,
            class: extract::class_badge(&record.control),
            preview: extract::preview(record),
        }
    }
}

/// A page of search results plus the context needed to render it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<&'a str>,
    /// Matches before the limit was applied
    pub total: usize,
    #[serde(rename = "results")]
    pub rows: Vec<SearchRow<'a>>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub warnings: &'a [String],
}

/// Renders search results in the selected format
pub struct SearchResultFormatter {
    format: OutputFormat,
}

impl SearchResultFormatter {
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, report: &SearchReport<'_>) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                print!("{}", TextFormatter::search_results(report));
                Ok(())
            },
            OutputFormat::Json => JsonFormatter::print(report),
            OutputFormat::Ndjson => JsonFormatter::print_lines(&report.rows),
        }
    }
}
