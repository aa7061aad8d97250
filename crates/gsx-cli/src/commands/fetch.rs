//! Catalog download with cache fallback

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use colored::Colorize;
use gsx_core::{LoadedCatalog, Origin};
use serde::Serialize;

use super::report_warnings;
use crate::output::{JsonFormatter, OutputFormat, spinner};
use crate::utils::{CatalogContext, resolve_url};

/// What `gsx fetch` reports about a load
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchReport<'a> {
    url: &'a str,
    origin: Origin,
    controls: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    warnings: &'a [String],
}

impl<'a> FetchReport<'a> {
    fn new(url: &'a str, loaded: &'a LoadedCatalog) -> Self {
        Self {
            url,
            origin: loaded.origin,
            controls: loaded.outcome.controls.len(),
            fetched_at: loaded.fetched_at,
            error: loaded.error.as_deref(),
            warnings: &loaded.outcome.warnings,
        }
    }
}

/// Fetch the catalog at `url` (or the configured one) into the cache.
///
/// # Errors
///
/// Fails when fetching is disabled, no URL is configured, or the download
/// fails with nothing cached to fall back on.
pub async fn fetch_catalog(
    context: &CatalogContext,
    url: Option<&str>,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    if !context.config.defaults.fetch_enabled {
        bail!("Fetching is disabled in the config file (defaults.fetch_enabled = false)");
    }

    let url = resolve_url(url, &context.config)?;
    let loader = context.loader()?;

    let pb = spinner(&format!("Fetching {url}"), quiet || format.is_machine());
    let result = loader.load_live(&url).await;
    pb.finish_and_clear();
    let loaded = result.with_context(|| format!("Failed to load catalog from {url}"))?;

    let report = FetchReport::new(&url, &loaded);
    match format {
        OutputFormat::Text => {
            if !quiet {
                print_text(&report);
            }
            report_warnings(report.warnings, format, quiet);
        },
        OutputFormat::Json => JsonFormatter::print(&report)?,
        OutputFormat::Ndjson => JsonFormatter::print_lines([&report])?,
    }
    Ok(())
}

fn print_text(report: &FetchReport<'_>) {
    let fetched = report
        .fetched_at
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default();

    match report.origin {
        Origin::Cached => {
            if let Some(error) = report.error {
                println!("{} Live fetch failed: {error}", "⚠".yellow());
            }
            println!(
                "{} Loaded {} controls from cached copy of {} (fetched {fetched})",
                "✓".green(),
                report.controls,
                report.url.bold()
            );
        },
        Origin::Live | Origin::File => {
            println!(
                "{} Loaded {} controls from {} at {fetched}",
                "✓".green(),
                report.controls,
                report.url.bold()
            );
        },
    }
}
