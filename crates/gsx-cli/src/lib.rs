//! gsx CLI - search security-control catalogs from the terminal
//!
//! The binary in `main.rs` only calls [`run`]; argument parsing, logging
//! setup and command dispatch live here.

use anyhow::Result;
use clap::{CommandFactory, Parser};

mod cli;
mod commands;
mod output;
mod utils;

use cli::{CacheCommands, Cli, Commands};
use commands::{ExportRequest, SearchRequest};
use utils::{CatalogContext, initialize_logging};

/// Execute the gsx CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns an error if logging setup, configuration loading, or the selected
/// command fails.
pub async fn run() -> Result<()> {
    // Exit quietly when stdout is closed early, e.g. `gsx search x | head`
    std::panic::set_hook(Box::new(|info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe") || msg.contains("broken pipe") {
            std::process::exit(0);
        }
        eprintln!("{msg}");
    }));

    let cli = Cli::parse();
    initialize_logging(&cli)?;
    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let command = match command {
        Commands::Completions { shell } => {
            commands::generate(shell);
            return Ok(());
        },
        Commands::Config { command } => {
            return commands::run_config(cli.config.as_deref(), command, quiet);
        },
        other => other,
    };

    let context = CatalogContext::new(cli.config.as_deref())?;

    match command {
        Commands::Fetch { url, format } => {
            commands::fetch_catalog(&context, url.as_deref(), format, quiet).await?;
        },
        Commands::Search {
            query,
            group,
            limit,
            all,
            format,
            source,
        } => {
            let request = SearchRequest {
                query,
                group,
                limit,
                all,
                format,
            };
            commands::search(&context, &source, &request, quiet)?;
        },
        Commands::Show { id, format, source } => {
            commands::show_control(&context, &source, &id, format, quiet)?;
        },
        Commands::Export {
            query,
            group,
            ids,
            format,
            output,
            source,
        } => {
            let request = ExportRequest {
                query,
                group,
                ids,
                format,
                output,
            };
            commands::export_controls(&context, &source, &request, quiet)?;
        },
        Commands::Diff {
            before,
            after,
            all,
            format,
        } => commands::show_diff(&before, &after, all, format, quiet)?,
        Commands::Groups { format, source } => {
            commands::list_groups(&context, &source, format, quiet)?;
        },
        Commands::Cache { command } => match command {
            CacheCommands::List { format } => commands::list_cache(&context, format)?,
            CacheCommands::Clear { force } => commands::clear_cache(&context, force)?,
        },
        Commands::Completions { .. } | Commands::Config { .. } => {},
    }
    Ok(())
}
