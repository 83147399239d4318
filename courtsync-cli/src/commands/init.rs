//! `courtsync init --endpoint <url> --sheet-id <id> [--tab <name>] [...]`

use anyhow::{Context, Result};
use clap::Args;

use courtsync_core::config;

use super::super::SourceFormatArg;

/// Write a starter configuration file under `~/.courtsync/`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// HTTP(S) endpoint returning the ratings table.
    #[arg(long)]
    pub endpoint: String,

    /// Destination spreadsheet ID.
    #[arg(long = "sheet-id")]
    pub sheet_id: String,

    /// Destination tab (worksheet) name. Must be URL-safe.
    #[arg(long, default_value = "Ratings")]
    pub tab: String,

    /// Payload format: csv | json. Defaults to csv.
    #[arg(long = "format", short = 'f', value_name = "FORMAT")]
    pub format: Option<SourceFormatArg>,

    /// JSON key holding the record list (json format only).
    #[arg(long = "records-key")]
    pub records_key: Option<String>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let format = self.format.map(|f| f.into()).unwrap_or_default();

        let (config, created) = config::init_at(
            &home,
            self.endpoint,
            format,
            self.records_key,
            self.sheet_id,
            self.tab,
        )
        .context("failed to write config")?;

        let path = config::config_path_at(&home);
        if created {
            println!("✓ Wrote {}", path.display());
            println!(
                "  Set ${} (or token_file) before running `courtsync run`.",
                config.token_env
            );
        } else {
            println!(
                "Config already exists at {}; leaving it unchanged.",
                path.display()
            );
        }
        Ok(())
    }
}
