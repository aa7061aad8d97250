//! Comparison of two catalog payload files

use anyhow::{Context, Result};
use gsx_core::{ChangeStatus, ControlChange, DiffSummary, diff, load_file, summarize};
use serde::Serialize;
use std::path::Path;

use super::report_warnings;
use crate::output::{JsonFormatter, OutputFormat, TextFormatter};

#[derive(Serialize)]
struct DiffOutput<'a> {
    summary: DiffSummary,
    changes: Vec<&'a ControlChange<'a>>,
}

/// Print the differences between the controls of `before` and `after`.
///
/// Unchanged controls are counted but only listed with `show_unchanged`.
///
/// # Errors
///
/// Returns an error if either file cannot be read.
pub fn show_diff(
    before: &Path,
    after: &Path,
    show_unchanged: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let before_catalog =
        load_file(before).with_context(|| format!("Failed to read {}", before.display()))?;
    let after_catalog =
        load_file(after).with_context(|| format!("Failed to read {}", after.display()))?;
    report_warnings(&before_catalog.outcome.warnings, format, quiet);
    report_warnings(&after_catalog.outcome.warnings, format, quiet);

    let changes = diff(
        &before_catalog.outcome.controls,
        &after_catalog.outcome.controls,
    );
    let summary = summarize(&changes);

    match format {
        OutputFormat::Text => print!("{}", TextFormatter::diff(&changes, &summary, show_unchanged)),
        OutputFormat::Json => JsonFormatter::print(&DiffOutput {
            summary,
            changes: visible(&changes, show_unchanged),
        })?,
        OutputFormat::Ndjson => JsonFormatter::print_lines(visible(&changes, show_unchanged))?,
    }
    Ok(())
}

fn visible<'a>(changes: &'a [ControlChange<'a>], show_unchanged: bool) -> Vec<&'a ControlChange<'a>> {
    changes
        .iter()
        .filter(|change| show_unchanged || change.status != ChangeStatus::Unchanged)
        .collect()
}
