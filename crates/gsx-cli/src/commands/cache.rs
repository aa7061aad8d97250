//! Cache listing and clearing

use anyhow::Result;
use colored::Colorize;
use gsx_core::CatalogCache;
use std::io::{self, Write};

use crate::output::{JsonFormatter, OutputFormat, TextFormatter};
use crate::utils::{CatalogContext, open_storage};

/// Outcome of [`execute_clear`]
#[derive(Debug, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing was cached.
    AlreadyEmpty,
    /// The user declined the prompt.
    Cancelled,
    /// Entries removed.
    Cleared { cleared: usize },
}

/// Print the cached catalogs.
///
/// # Errors
///
/// Returns an error if the cache cannot be opened or listed.
pub fn list_cache(context: &CatalogContext, format: OutputFormat) -> Result<()> {
    let storage = open_storage(&context.config)?;
    let entries = storage.list()?;

    match format {
        OutputFormat::Text => print!("{}", TextFormatter::cache_entries(&entries)),
        OutputFormat::Json => JsonFormatter::print(&entries)?,
        OutputFormat::Ndjson => JsonFormatter::print_lines(&entries)?,
    }
    Ok(())
}

/// Clear `cache`, asking `confirm` first unless `force` is set.
///
/// # Errors
///
/// Returns an error if listing, confirmation, or deletion fails.
pub fn execute_clear<C, W, F>(cache: &C, mut writer: W, force: bool, mut confirm: F) -> Result<ClearOutcome>
where
    C: CatalogCache,
    W: Write,
    F: FnMut(&[String]) -> Result<bool>,
{
    let urls: Vec<String> = cache.list()?.into_iter().map(|entry| entry.url).collect();

    if urls.is_empty() {
        writeln!(writer, "{} Cache is already empty", "ℹ".blue())?;
        return Ok(ClearOutcome::AlreadyEmpty);
    }

    writeln!(
        writer,
        "{} This will delete {} cached catalog(s):",
        "⚠".yellow(),
        urls.len()
    )?;
    for url in &urls {
        writeln!(writer, "  • {url}")?;
    }

    if !force && !confirm(&urls)? {
        writeln!(writer, "{} Cancelled", "✗".red())?;
        return Ok(ClearOutcome::Cancelled);
    }

    let cleared = cache.clear()?;
    writeln!(writer, "{} Removed {cleared} cached catalog(s)", "✓".green())?;
    Ok(ClearOutcome::Cleared { cleared })
}

/// Clear the on-disk cache, prompting on the terminal.
///
/// # Errors
///
/// Returns an error if the cache cannot be opened, the prompt fails, or
/// deletion fails.
pub fn clear_cache(context: &CatalogContext, force: bool) -> Result<()> {
    let storage = open_storage(&context.config)?;
    let stdout = io::stdout();
    let mut stdout_lock = stdout.lock();
    let mut input = String::new();

    execute_clear(&storage, &mut stdout_lock, force, |_urls| {
        let mut prompt = io::stdout().lock();
        write!(prompt, "Are you sure you want to continue? [y/N] ")?;
        prompt.flush()?;

        input.clear();
        io::stdin().read_line(&mut input)?;
        Ok(matches!(
            input.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    })?;
    Ok(())
}
