//! `courtsync diff` — unified diff of upstream content against the snapshot.

use anyhow::{Context, Result};
use clap::Args;

use courtsync_core::config;
use courtsync_fetch::HttpSource;
use courtsync_sync::diff::diff_source;

/// Arguments for `courtsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home)
            .context("failed to load config — run `courtsync init` first")?;
        let data_dir = config::data_dir_at(&home);

        let source = HttpSource::from_config(&config);
        let result = diff_source(&config, &data_dir, &source)
            .with_context(|| format!("diff failed for '{}'", config.source_endpoint))?;

        if !result.changed {
            println!("No upstream changes since the last snapshot.");
            return Ok(());
        }

        print!("{}", result.unified_diff);
        if !result.unified_diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
