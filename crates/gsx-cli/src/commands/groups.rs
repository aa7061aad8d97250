//! Group listing

use anyhow::Result;

use super::{report_empty_catalog, report_warnings};
use crate::cli::SourceArgs;
use crate::output::{JsonFormatter, OutputFormat, TextFormatter};
use crate::utils::CatalogContext;

/// Print the distinct group titles of the catalog, sorted.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub fn list_groups(
    context: &CatalogContext,
    source: &SourceArgs,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let session = context.open_session(source)?;
    report_warnings(session.warnings(), format, quiet);
    if session.records().is_empty() {
        report_empty_catalog(format);
    }

    let groups = session.groups();
    match format {
        OutputFormat::Text => print!("{}", TextFormatter::groups(&groups)),
        OutputFormat::Json => JsonFormatter::print(&groups)?,
        OutputFormat::Ndjson => JsonFormatter::print_lines(&groups)?,
    }
    Ok(())
}
