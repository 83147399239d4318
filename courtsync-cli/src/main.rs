//! Courtsync — ratings-table to Google Sheets sync CLI.
//!
//! # Usage
//!
//! ```text
//! courtsync init --endpoint <url> --sheet-id <id> [--tab <name>] [--format csv|json]
//! courtsync run [--dry-run] [--force]
//! courtsync fetch
//! courtsync status [--json]
//! courtsync diff
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, fetch::FetchArgs, init::InitArgs, run::RunArgs, status::StatusArgs,
};
use courtsync_core::config::SourceFormat;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "courtsync",
    version,
    about = "Sync a ratings table into a Google Sheets tab, once per meaningful change",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter configuration file.
    Init(InitArgs),

    /// Fetch, compare, and upload when the content changed.
    Run(RunArgs),

    /// Download and validate the table without uploading.
    Fetch(FetchArgs),

    /// Show season, run-record, and snapshot state.
    Status(StatusArgs),

    /// Show a unified diff between the stored snapshot and a fresh fetch.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Shared SourceFormat argument — parsed from CLI strings, converts to core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `SourceFormat` from CLI args.
#[derive(Debug, Clone, Default)]
pub struct SourceFormatArg(pub SourceFormat);

impl FromStr for SourceFormatArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self(SourceFormat::Csv)),
            "json" => Ok(Self(SourceFormat::Json)),
            other => Err(format!(
                "unknown source format '{other}'; expected: csv, json"
            )),
        }
    }
}

impl fmt::Display for SourceFormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<SourceFormatArg> for SourceFormat {
    fn from(f: SourceFormatArg) -> Self {
        f.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Run(args) => args.run(),
        Commands::Fetch(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}
