//! CSV and Markdown export

use anyhow::{Context, Result, bail};
use colored::Colorize;
use gsx_core::export::{CSV_FILE_NAME, MARKDOWN_FILE_NAME};
use gsx_core::{ControlRecord, SearchFilters, export_csv, export_markdown};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::report_warnings;
use crate::cli::{ExportFormat, SourceArgs};
use crate::output::OutputFormat;
use crate::utils::CatalogContext;

impl ExportFormat {
    /// File name used when the output path is a directory
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Csv => CSV_FILE_NAME,
            Self::Markdown => MARKDOWN_FILE_NAME,
        }
    }

    pub fn render<'a, I>(self, records: I) -> String
    where
        I: IntoIterator<Item = &'a ControlRecord>,
    {
        match self {
            Self::Csv => export_csv(records),
            Self::Markdown => export_markdown(records),
        }
    }
}

/// Parameters of one `gsx export` invocation
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub query: Vec<String>,
    pub group: Option<String>,
    /// Explicit selection; overrides query and group
    pub ids: Vec<String>,
    pub format: ExportFormat,
    pub output: Option<PathBuf>,
}

/// Export the controls matching the query and group, or exactly the given ids.
///
/// Without an output path the document goes to stdout. A directory as output
/// receives a file with the default name for the format.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the query fails, an
/// explicitly requested id is unknown, or the file cannot be written.
pub fn export_controls(
    context: &CatalogContext,
    source: &SourceArgs,
    request: &ExportRequest,
    quiet: bool,
) -> Result<()> {
    let session = context.open_session(source)?;
    report_warnings(session.warnings(), OutputFormat::Text, quiet);

    let selected: Vec<&ControlRecord> = if request.ids.is_empty() {
        let filters = request
            .group
            .as_deref()
            .map_or_else(SearchFilters::default, |group| {
                SearchFilters::default().with_group(group)
            });
        session
            .search(request.query.join(" ").trim(), &filters)?
            .into_iter()
            .map(|hit| hit.record)
            .collect()
    } else {
        let ids: Vec<&str> = request.ids.iter().map(|id| id.trim()).collect();
        let missing: Vec<&str> = ids
            .iter()
            .copied()
            .filter(|id| session.get(id).is_none())
            .collect();
        if !missing.is_empty() {
            bail!("Unknown control id(s): {}", missing.join(", "));
        }
        session.select(&ids)
    };

    let format = request.format;
    let document = format.render(selected.iter().copied());

    match request.output.as_deref() {
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.flush()?;
        },
        Some(path) => {
            let target = resolve_target(path, format);
            fs::write(&target, document)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            info!("Exported {} controls to {}", selected.len(), target.display());
            if !quiet {
                eprintln!(
                    "{} Exported {} controls to {}",
                    "✓".green(),
                    selected.len(),
                    target.display()
                );
            }
        },
    }
    Ok(())
}

fn resolve_target(path: &Path, format: ExportFormat) -> PathBuf {
    if path.is_dir() {
        path.join(format.default_file_name())
    } else {
        path.to_path_buf()
    }
}
