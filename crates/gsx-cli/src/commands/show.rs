//! Control detail view

use anyhow::{Result, bail};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use gsx_core::{ControlDetail, ControlRecord};
use serde::Serialize;

use super::report_warnings;
use crate::cli::SourceArgs;
use crate::output::{JsonFormatter, OutputFormat, TextFormatter};
use crate::utils::CatalogContext;

const MAX_SUGGESTIONS: usize = 5;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowOutput<'a> {
    #[serde(flatten)]
    detail: ControlDetail,
    full_text: &'a str,
}

/// Print the detail view of control `id`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or no control has `id`;
/// in the latter case the message lists similar ids.
pub fn show_control(
    context: &CatalogContext,
    source: &SourceArgs,
    id: &str,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let session = context.open_session(source)?;
    report_warnings(session.warnings(), format, quiet);

    let id = id.trim();
    let Some(record) = session.get(id) else {
        let suggestions = suggest_ids(session.records(), id);
        if suggestions.is_empty() {
            bail!("Control '{id}' not found");
        }
        bail!(
            "Control '{id}' not found. Did you mean: {}?",
            suggestions.join(", ")
        );
    };

    let detail = ControlDetail::from_record(record);
    match format {
        OutputFormat::Text => print!("{}", TextFormatter::detail(&detail)),
        OutputFormat::Json | OutputFormat::Ndjson => {
            let output = ShowOutput {
                detail,
                full_text: &record.full_text,
            };
            if format == OutputFormat::Json {
                JsonFormatter::print(&output)?;
            } else {
                JsonFormatter::print_lines([&output])?;
            }
        },
    }
    Ok(())
}

/// Ids fuzzily resembling `query`, best first
fn suggest_ids<'a>(records: &'a [ControlRecord], query: &str) -> Vec<&'a str> {
    let matcher = SkimMatcherV2::default();
    let query = query.to_lowercase();

    let mut scored: Vec<(i64, &str)> = records
        .iter()
        .filter_map(|record| {
            matcher
                .fuzzy_match(&record.id.to_lowercase(), &query)
                .map(|score| (score, record.id.as_str()))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);

    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, id)| id)
        .collect()
}
