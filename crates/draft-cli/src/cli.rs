//! Command-line arguments for `contract-drafter`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use draft_cli::config::Overrides;

#[derive(Parser)]
#[command(
    name = "contract-drafter",
    version,
    about = "Generate contract documents from a .docx template and a table of rows",
    long_about = "Render one document per table row from a .docx template.\n\n\
                  Successful documents are packed into a single ZIP archive; rows that\n\
                  fail are listed in an optional JSON manifest instead of aborting the batch."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow contract values in trace logs. Redacted otherwise.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render every row of a table and write the archive.
    Generate(GenerateArgs),

    /// List the placeholders a template expects.
    Placeholders(PlaceholdersArgs),
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// The .docx template.
    #[arg(long, value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// The .csv table, one contract per row.
    #[arg(long, value_name = "TABLE")]
    pub table: PathBuf,

    /// Archive path (default: contracts_<generated>.zip).
    #[arg(long, short = 'o', value_name = "ZIP")]
    pub output: Option<PathBuf>,

    /// Write the failure manifest as JSON.
    #[arg(long, value_name = "JSON")]
    pub manifest: Option<PathBuf>,

    /// TOML file with [batch] and [table] settings.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Column that names each document.
    #[arg(long = "identity-column", value_name = "COLUMN")]
    pub identity_column: Option<String>,

    /// Column to format as a date. Repeat for several; replaces the defaults.
    #[arg(long = "date-column", value_name = "COLUMN")]
    pub date_columns: Vec<String>,

    /// Extension of the archive entries.
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Per-row render timeout in milliseconds (0 disables it).
    #[arg(long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Render rows on this many threads.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Read every cell as text (keeps leading zeros in identifiers).
    #[arg(long = "text-only")]
    pub text_only: bool,
}

impl GenerateArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            identity_column: self.identity_column.clone(),
            date_columns: self.date_columns.clone(),
            extension: self.extension.clone(),
            timeout_ms: self.timeout_ms,
            workers: self.workers,
            text_only: self.text_only,
        }
    }
}

#[derive(Parser)]
pub struct PlaceholdersArgs {
    /// The .docx template.
    #[arg(long, value_name = "TEMPLATE")]
    pub template: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn repeated_date_columns_are_collected() {
        let cli = Cli::try_parse_from([
            "contract-drafter",
            "generate",
            "--template",
            "t.docx",
            "--table",
            "rows.csv",
            "--date-column",
            "signed_on",
            "--date-column",
            "due",
            "--workers",
            "4",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.date_columns, ["signed_on", "due"]);
        assert_eq!(overrides.workers, Some(4));
        assert!(overrides.identity_column.is_none());
    }
}
