//! `courtsync status` — season, run-record, and snapshot visibility.

use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use courtsync_core::config::{self, SyncConfig};
use courtsync_fetch::snapshot;
use courtsync_sync::state;

/// Arguments for `courtsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home)
            .context("failed to load config — run `courtsync init` first")?;
        let data_dir = config::data_dir_at(&home);

        let report = build_report(&config, &data_dir)?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&config, &report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    in_season: bool,
    already_ran_today: bool,
    last_run: Option<String>,
    fingerprint: Option<String>,
    snapshot_bytes: Option<u64>,
    snapshot_age_seconds: Option<u64>,
    source_endpoint: String,
    destination_sheet_id: String,
    destination_tab: String,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "field")]
    field: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

fn build_report(config: &SyncConfig, data_dir: &Path) -> Result<StatusReport> {
    let record = state::load_at(data_dir).context("failed to load run record")?;
    let today = Local::now().date_naive();

    let (snapshot_bytes, snapshot_age_seconds) =
        match std::fs::metadata(snapshot::snapshot_path_at(data_dir)) {
            Ok(meta) => {
                let age = meta
                    .modified()
                    .ok()
                    .and_then(|m| SystemTime::now().duration_since(m).ok())
                    .map(|d| d.as_secs());
                (Some(meta.len()), age)
            }
            Err(_) => (None, None),
        };

    Ok(StatusReport {
        in_season: config.season.contains(today),
        already_ran_today: record.last_run == Some(today),
        last_run: record.last_run.map(|d| d.to_string()),
        fingerprint: record.fingerprint.map(|f| f.to_string()),
        snapshot_bytes,
        snapshot_age_seconds,
        source_endpoint: config.source_endpoint.clone(),
        destination_sheet_id: config.destination_sheet_id.clone(),
        destination_tab: config.destination_tab.clone(),
    })
}

fn print_table(config: &SyncConfig, report: &StatusReport) {
    println!(
        "Courtsync v{} | {}",
        env!("CARGO_PKG_VERSION"),
        report.source_endpoint
    );

    let season = if report.in_season {
        "IN SEASON".green().bold().to_string()
    } else {
        "OFF SEASON".yellow().bold().to_string()
    };
    let last_run = match (&report.last_run, report.already_ran_today) {
        (Some(date), true) => format!("{date} (today)"),
        (Some(date), false) => date.clone(),
        (None, _) => "never".to_string(),
    };
    let fingerprint = report
        .fingerprint
        .as_deref()
        .map(|f| f[..f.len().min(12)].to_string())
        .unwrap_or_else(|| "none".to_string());
    let snapshot = match report.snapshot_bytes {
        Some(bytes) => {
            let age = report
                .snapshot_age_seconds
                .map(|s| format!(", {} old", format_age(s)))
                .unwrap_or_default();
            format!("{bytes} bytes{age}")
        }
        None => "none".to_string(),
    };

    let rows = vec![
        StatusRow {
            field: "season",
            value: season,
        },
        StatusRow {
            field: "last run",
            value: last_run,
        },
        StatusRow {
            field: "fingerprint",
            value: fingerprint,
        },
        StatusRow {
            field: "snapshot",
            value: snapshot,
        },
        StatusRow {
            field: "destination",
            value: format!(
                "{}/{}",
                report.destination_sheet_id, report.destination_tab
            ),
        },
    ];

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if !report.in_season {
        println!(
            "Season window: {:02}-{:02} through {:02}-{:02}. `courtsync run --force` overrides.",
            config.season.start_month,
            config.season.start_day,
            config.season.end_month,
            config.season.end_day,
        );
    }
}

fn format_age(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_formatting_is_compact() {
        assert_eq!(format_age(42), "42s");
        assert_eq!(format_age(65), "1m");
        assert_eq!(format_age(3 * 60 * 60 + 40), "3h");
        assert_eq!(format_age(60 * 60 * 24 * 2), "2d");
    }
}
