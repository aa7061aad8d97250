//! Free-text and group search

use anyhow::Result;
use colored::Colorize;
use gsx_core::SearchFilters;

use super::{report_empty_catalog, report_warnings};
use crate::cli::SourceArgs;
use crate::output::{OutputFormat, SearchReport, SearchResultFormatter, SearchRow};
use crate::utils::CatalogContext;

/// Parameters of one `gsx search` invocation
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: Vec<String>,
    pub group: Option<String>,
    pub limit: Option<usize>,
    pub all: bool,
    pub format: OutputFormat,
}

impl SearchRequest {
    /// Query words joined by single spaces
    pub fn query_text(&self) -> String {
        self.query.join(" ").trim().to_string()
    }

    pub fn filters(&self) -> SearchFilters {
        match &self.group {
            Some(group) => SearchFilters::default().with_group(group.as_str()),
            None => SearchFilters::default(),
        }
    }

    fn effective_limit(&self, default_limit: usize) -> usize {
        if self.all {
            usize::MAX
        } else {
            self.limit.unwrap_or(default_limit)
        }
    }
}

/// Run a search against the catalog named by `source`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the index query fails.
pub fn search(
    context: &CatalogContext,
    source: &SourceArgs,
    request: &SearchRequest,
    quiet: bool,
) -> Result<()> {
    let query = request.query_text();
    let filters = request.filters();
    let formatter = SearchResultFormatter::new(request.format);

    if query.is_empty() && filters.group.is_none() {
        if !request.format.is_machine() {
            eprintln!(
                "{} Enter a search term, or pass --group to browse a group",
                "ℹ".blue()
            );
        }
        return formatter.format(&SearchReport {
            query: &query,
            group: None,
            total: 0,
            rows: Vec::new(),
            warnings: &[],
        });
    }

    let session = context.open_session(source)?;
    report_warnings(session.warnings(), request.format, quiet);
    if session.records().is_empty() {
        report_empty_catalog(request.format);
    }

    let hits = session.search(&query, &filters)?;
    let limit = request.effective_limit(context.config.defaults.result_limit);

    let report = SearchReport {
        query: &query,
        group: filters.group.as_deref(),
        total: hits.len(),
        rows: hits.iter().take(limit).map(SearchRow::from_ranked).collect(),
        warnings: session.warnings(),
    };
    formatter.format(&report)
}
