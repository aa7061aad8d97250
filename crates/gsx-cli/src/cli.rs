//! # CLI Structure and Argument Parsing
//!
//! Command-line interface for `gsx`, built with `clap` derive macros.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Download a catalog into the local cache
//! gsx fetch --url https://example.org/grundschutz/catalog.json
//!
//! # Search the cached catalog
//! gsx search datensicherung --limit 10
//! gsx search --group "Betrieb"
//!
//! # Inspect, export and compare
//! gsx show OPS.1.1.5.A1
//! gsx export backup --format markdown -o controls.md
//! gsx diff old.json new.json
//! ```
//!
//! ## Catalog Sources
//!
//! Commands that read a catalog take either `--url` (the cached payload for
//! that URL) or `--file` (a payload on disk). Without either, the configured
//! `defaults.catalog_url` is used.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Main CLI structure for the `gsx` command
#[derive(Parser, Clone, Debug)]
#[command(name = "gsx")]
#[command(version, about = "Search security-control catalogs from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "GSX_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Where a command reads its catalog from
#[derive(Args, Clone, Debug, Default)]
pub struct SourceArgs {
    /// Catalog URL whose cached payload is used
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Read the payload from a local JSON file instead of the cache
    #[arg(long, value_name = "PATH", conflicts_with = "url")]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Download a catalog and store it in the local cache
    Fetch {
        /// Catalog URL (defaults to the configured URL)
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Search controls by free text and group
    Search {
        /// Search terms; may be omitted when `--group` is given
        query: Vec<String>,

        /// Only controls whose group path contains this text
        #[arg(short = 'g', long)]
        group: Option<String>,

        /// Maximum number of results (defaults to `defaults.result_limit`)
        #[arg(short = 'n', long, conflicts_with = "all")]
        limit: Option<usize>,

        /// Show every result
        #[arg(long)]
        all: bool,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show the full detail of a control
    Show {
        /// Control id
        id: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Export controls as CSV or Markdown
    Export {
        /// Search terms selecting the exported controls
        query: Vec<String>,

        /// Only controls whose group path contains this text
        #[arg(short = 'g', long)]
        group: Option<String>,

        /// Export exactly these ids, in this order
        #[arg(long, value_delimiter = ',', conflicts_with_all = ["query", "group"])]
        ids: Vec<String>,

        /// Export format
        #[arg(short = 'f', long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file or directory (stdout when omitted)
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Compare the controls of two payload files
    Diff {
        /// Older payload
        before: PathBuf,

        /// Newer payload
        after: PathBuf,

        /// Include unchanged controls
        #[arg(long)]
        all: bool,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List distinct group titles
    Groups {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Inspect or clear the payload cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Read or change settings in the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum CacheCommands {
    /// List cached catalogs
    List {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove every cached catalog
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigCommands {
    /// Print one setting, or all of them
    Get {
        /// Setting such as `defaults.catalog_url`
        key: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change a setting; an empty value clears optional settings
    Set {
        /// Setting such as `defaults.result_limit`
        key: String,

        /// New value
        value: String,
    },

    /// Print the location of the configuration file
    Path,
}

/// File formats produced by `gsx export`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Markdown,
}

impl Commands {
    /// Output format of commands that print structured data
    pub const fn output_format(&self) -> Option<OutputFormat> {
        match self {
            Self::Fetch { format, .. }
            | Self::Search { format, .. }
            | Self::Show { format, .. }
            | Self::Diff { format, .. }
            | Self::Groups { format, .. }
            | Self::Cache {
                command: CacheCommands::List { format },
            }
            | Self::Config {
                command: ConfigCommands::Get { format, .. },
            } => Some(*format),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_collects_query_words() {
        let cli = Cli::try_parse_from(["gsx", "search", "backup", "test", "--group", "OPS"]).unwrap();
        match cli.command {
            Some(Commands::Search { query, group, .. }) => {
                assert_eq!(query, vec!["backup", "test"]);
                assert_eq!(group.as_deref(), Some("OPS"));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_url_and_file_conflict() {
        let result = Cli::try_parse_from([
            "gsx",
            "groups",
            "--url",
            "https://example.org/c.json",
            "--file",
            "c.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_ids_are_comma_separated() {
        let cli = Cli::try_parse_from(["gsx", "export", "--ids", "A,B", "-f", "markdown"]).unwrap();
        match cli.command {
            Some(Commands::Export { ids, format, .. }) => {
                assert_eq!(ids, vec!["A", "B"]);
                assert_eq!(format, ExportFormat::Markdown);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_set_takes_key_and_value() {
        let cli = Cli::try_parse_from(["gsx", "config", "set", "defaults.result_limit", "5"])
            .unwrap();
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Set { key, value },
            }) => {
                assert_eq!(key, "defaults.result_limit");
                assert_eq!(value, "5");
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_output_format_lookup() {
        let cli = Cli::try_parse_from(["gsx", "cache", "list", "-f", "json"]).unwrap();
        assert_eq!(
            cli.command.unwrap().output_format(),
            Some(OutputFormat::Json)
        );

        let cli = Cli::try_parse_from(["gsx", "completions", "bash"]).unwrap();
        assert_eq!(cli.command.unwrap().output_format(), None);
    }
}
