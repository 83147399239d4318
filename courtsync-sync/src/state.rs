//! Run-record store — the last successful run date and content fingerprint.
//!
//! Two small text files under `<home>/.courtsync/`:
//! `last_run.txt` (ISO 8601 date) and `fingerprint.txt` (hex digest).
//! Read once at the start of a run, written once after a fully successful
//! sync with the same atomic `.tmp` + rename pattern as the config.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use courtsync_core::Fingerprint;

use crate::error::{io_err, SyncError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// What the previous invocation left behind. Either file may be absent on a
/// first run or after a manual reset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunRecord {
    pub last_run: Option<NaiveDate>,
    pub fingerprint: Option<Fingerprint>,
}

/// `<data_dir>/last_run.txt` — pure, no I/O.
pub fn last_run_path_at(data_dir: &Path) -> PathBuf {
    data_dir.join("last_run.txt")
}

/// `<data_dir>/fingerprint.txt` — pure, no I/O.
pub fn fingerprint_path_at(data_dir: &Path) -> PathBuf {
    data_dir.join("fingerprint.txt")
}

/// Load the run record. Missing files mean an empty record, never an error.
///
/// An unparseable date is logged and treated as absent: the daily gate is an
/// advisory pre-condition, and refusing to run because a marker file is
/// corrupt would invert its purpose.
pub fn load_at(data_dir: &Path) -> Result<RunRecord, SyncError> {
    let last_run = match read_trimmed(&last_run_path_at(data_dir))? {
        Some(text) => match NaiveDate::parse_from_str(&text, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(err) => {
                tracing::warn!("ignoring unparseable last_run marker '{text}': {err}");
                None
            }
        },
        None => None,
    };
    let fingerprint = read_trimmed(&fingerprint_path_at(data_dir))?.map(Fingerprint::from);
    Ok(RunRecord {
        last_run,
        fingerprint,
    })
}

/// Persist both markers after a fully successful sync.
///
/// Callers must not invoke this on any failure path: a failed destination
/// write keeps the previous fingerprint so the next invocation retries the
/// full sync instead of mistaking itself for already-synced.
pub fn record_success_at(
    data_dir: &Path,
    today: NaiveDate,
    fingerprint: &Fingerprint,
) -> Result<(), SyncError> {
    std::fs::create_dir_all(data_dir).map_err(|e| io_err(data_dir, e))?;
    write_atomic(
        &last_run_path_at(data_dir),
        &format!("{}\n", today.format(DATE_FORMAT)),
    )?;
    write_atomic(
        &fingerprint_path_at(data_dir),
        &format!("{}\n", fingerprint.as_str()),
    )?;
    Ok(())
}

fn read_trimmed(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), SyncError> {
    let tmp = path.with_extension("txt.tmp");
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_record_when_files_missing() {
        let dir = TempDir::new().unwrap();
        let record = load_at(dir.path()).unwrap();
        assert_eq!(record, RunRecord::default());
    }

    #[test]
    fn roundtrip_record_and_load() {
        let dir = TempDir::new().unwrap();
        let fp = Fingerprint::of(b"Team,Rank\nDuke,1\n");
        record_success_at(dir.path(), date(2026, 1, 15), &fp).unwrap();

        let record = load_at(dir.path()).unwrap();
        assert_eq!(record.last_run, Some(date(2026, 1, 15)));
        assert_eq!(record.fingerprint, Some(fp));
    }

    #[test]
    fn marker_files_are_plain_text() {
        let dir = TempDir::new().unwrap();
        let fp = Fingerprint::of(b"x");
        record_success_at(dir.path(), date(2025, 12, 3), &fp).unwrap();

        let last_run = std::fs::read_to_string(last_run_path_at(dir.path())).unwrap();
        assert_eq!(last_run, "2025-12-03\n");
        let stored = std::fs::read_to_string(fingerprint_path_at(dir.path())).unwrap();
        assert_eq!(stored.trim(), fp.as_str());
    }

    #[test]
    fn unparseable_date_is_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(last_run_path_at(dir.path()), "yesterday-ish\n").unwrap();
        let record = load_at(dir.path()).unwrap();
        assert_eq!(record.last_run, None);
    }

    #[test]
    fn whitespace_only_files_read_as_absent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(fingerprint_path_at(dir.path()), "  \n").unwrap();
        let record = load_at(dir.path()).unwrap();
        assert_eq!(record.fingerprint, None);
    }

    #[test]
    fn tmp_files_cleaned_up_after_record() {
        let dir = TempDir::new().unwrap();
        record_success_at(dir.path(), date(2026, 2, 1), &Fingerprint::of(b"y")).unwrap();
        assert!(!last_run_path_at(dir.path())
            .with_extension("txt.tmp")
            .exists());
        assert!(!fingerprint_path_at(dir.path())
            .with_extension("txt.tmp")
            .exists());
    }
}
