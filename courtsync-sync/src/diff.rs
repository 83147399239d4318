//! Preview diff between the stored snapshot and a fresh fetch.
//!
//! `courtsync diff` answers "what would change upstream of the sheet?"
//! without uploading anything. The stored snapshot is left untouched so a
//! following `run` still compares against the last *synced* content.

use std::path::Path;

use similar::TextDiff;

use courtsync_core::config::SyncConfig;
use courtsync_fetch::{snapshot, TableSource};

use crate::error::SyncError;
use crate::pipeline::fetch_with_retries;

/// Result of comparing a fresh fetch against the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDiff {
    pub changed: bool,
    pub unified_diff: String,
}

/// Fetch fresh bytes and diff them against the stored snapshot.
///
/// A missing snapshot diffs against empty content, so a first run shows the
/// entire upstream table as additions.
pub fn diff_source(
    config: &SyncConfig,
    data_dir: &Path,
    source: &dyn TableSource,
) -> Result<SourceDiff, SyncError> {
    let previous = snapshot::read_at(data_dir)?.unwrap_or_default();
    let fresh = fetch_with_retries(config, source)?;

    if previous == fresh {
        return Ok(SourceDiff {
            changed: false,
            unified_diff: String::new(),
        });
    }

    let old_text = String::from_utf8_lossy(&previous);
    let new_text = String::from_utf8_lossy(&fresh);
    let unified = TextDiff::from_lines(old_text.as_ref(), new_text.as_ref())
        .unified_diff()
        .header("a/snapshot.csv", "b/upstream")
        .context_radius(3)
        .to_string();

    Ok(SourceDiff {
        changed: true,
        unified_diff: unified,
    })
}
