//! `courtsync run` — the full gate → fetch → compare → upload pipeline.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use courtsync_core::config;
use courtsync_fetch::HttpSource;
use courtsync_sync::{
    pipeline::{self, Outcome, RunOptions},
    DiscardWriter, SheetWriter, SheetsClient,
};

/// Arguments for `courtsync run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Walk the full pipeline and report, but write nothing and advance no state.
    #[arg(long)]
    pub dry_run: bool,

    /// Bypass the season and once-per-day gates (manual catch-up run).
    #[arg(long)]
    pub force: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home)
            .context("failed to load config — run `courtsync init` first")?;
        let data_dir = config::data_dir_at(&home);

        let source = HttpSource::from_config(&config);
        // Dry runs never reach the write and must not require a token.
        let writer: Box<dyn SheetWriter> = if self.dry_run {
            Box::new(DiscardWriter)
        } else {
            Box::new(
                SheetsClient::from_config(&config)
                    .context("failed to build sheets client")?,
            )
        };

        let today = Local::now().date_naive();
        let options = RunOptions {
            dry_run: self.dry_run,
            force: self.force,
        };
        let outcome = pipeline::run(
            &config,
            &data_dir,
            &source,
            writer.as_ref(),
            today,
            options,
        )
        .with_context(|| format!("sync failed for '{}'", config.source_endpoint))?;

        print_outcome(&outcome, &config.destination_tab);
        Ok(())
    }
}

fn print_outcome(outcome: &Outcome, tab: &str) {
    // Deliberate skips exit 0: the scheduler treats them as quiet successes.
    match outcome {
        Outcome::Synced { rows } => println!("✓ synced {rows} data rows to '{tab}'"),
        Outcome::WouldSync { rows } => {
            println!("[dry-run] would sync {rows} data rows to '{tab}'")
        }
        Outcome::OutOfSeason => println!("Out of season; nothing to do."),
        Outcome::AlreadyRanToday => println!("Already ran today; nothing to do."),
        Outcome::Unchanged => println!("Content unchanged; skipping upload."),
    }
}
