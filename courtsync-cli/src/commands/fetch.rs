//! `courtsync fetch` — download and validate without uploading.

use anyhow::{Context, Result};
use clap::Args;

use courtsync_core::config;
use courtsync_fetch::HttpSource;
use courtsync_sync::pipeline;

/// Arguments for `courtsync fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {}

impl FetchArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home)
            .context("failed to load config — run `courtsync init` first")?;
        let data_dir = config::data_dir_at(&home);

        let source = HttpSource::from_config(&config);
        let (path, fingerprint, bytes) = pipeline::fetch_snapshot(&config, &data_dir, &source)
            .with_context(|| format!("fetch failed for '{}'", config.source_endpoint))?;

        println!("✓ fetched {bytes} bytes from '{}'", config.source_endpoint);
        println!("  snapshot:    {}", path.display());
        println!("  fingerprint: {fingerprint}");
        Ok(())
    }
}
