//! Idempotent sync pipeline shared by `courtsync run` and `courtsync fetch`.
//!
//! Step order: season gate → daily gate → fetch (bounded retries) → snapshot
//! → fingerprint compare → decode → destination replace → persist run record.
//! The gates run before any network call; the run record advances only after
//! everything downstream of it has succeeded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;

use courtsync_core::{config::SyncConfig, Fingerprint, SheetTarget};
use courtsync_fetch::{retry, snapshot, RetryPolicy, TableSource};

use crate::decode;
use crate::error::SyncError;
use crate::sheets::SheetWriter;
use crate::state;

/// How a pipeline invocation ended. Every variant is a success from the
/// process's point of view (exit 0); failures are `Err(SyncError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Destination replaced; fingerprint and daily marker advanced.
    Synced { rows: usize },
    /// Dry-run: destination would have been replaced. Nothing was written.
    WouldSync { rows: usize },
    /// Reference date outside the season window; no network call was made.
    OutOfSeason,
    /// A successful sync already happened today; no network call was made.
    AlreadyRanToday,
    /// Fetched content matches the stored fingerprint; upload skipped.
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Walk the full pipeline but write nothing and advance no state.
    pub dry_run: bool,
    /// Bypass the season and daily gates (manual catch-up). Never bypasses
    /// the fingerprint skip.
    pub force: bool,
}

/// Run the pipeline once, to completion.
///
/// This is the canonical entrypoint for `courtsync run`; tests drive it with
/// in-memory sources and writers.
pub fn run(
    config: &SyncConfig,
    data_dir: &Path,
    source: &dyn TableSource,
    writer: &dyn SheetWriter,
    today: NaiveDate,
    options: RunOptions,
) -> Result<Outcome, SyncError> {
    if !options.force && !config.season.contains(today) {
        tracing::info!("{today} is outside the season window; skipping");
        return Ok(Outcome::OutOfSeason);
    }

    let record = state::load_at(data_dir)?;
    if !options.force && record.last_run == Some(today) {
        tracing::info!("already completed a sync on {today}; skipping");
        return Ok(Outcome::AlreadyRanToday);
    }

    let bytes = fetch_with_retries(config, source)?;
    if !options.dry_run {
        snapshot::write_at(data_dir, &bytes)?;
    }

    let fingerprint = Fingerprint::of(&bytes);
    if record.fingerprint.as_ref() == Some(&fingerprint) {
        tracing::info!("content unchanged ({}); skipping upload", fingerprint.short());
        if !options.dry_run {
            // The day still counts as synced: the destination already holds
            // exactly this content.
            state::record_success_at(data_dir, today, &fingerprint)?;
        }
        return Ok(Outcome::Unchanged);
    }

    let table = decode::decode(
        config.source_format,
        config.json_records_key.as_deref(),
        &bytes,
    )?;
    let rows = table.row_count();

    if options.dry_run {
        return Ok(Outcome::WouldSync { rows });
    }

    let target = SheetTarget::new(&config.destination_sheet_id, &config.destination_tab);
    writer.replace(&target, &table)?;

    // Only now — after the destination write landed — does the run record
    // move, so a failed upload is retried in full next invocation.
    state::record_success_at(data_dir, today, &fingerprint)?;
    tracing::info!("synced {rows} rows to {target}");
    Ok(Outcome::Synced { rows })
}

/// Fetch and snapshot without touching the destination (`courtsync fetch`).
pub fn fetch_snapshot(
    config: &SyncConfig,
    data_dir: &Path,
    source: &dyn TableSource,
) -> Result<(PathBuf, Fingerprint, usize), SyncError> {
    let bytes = fetch_with_retries(config, source)?;
    let path = snapshot::write_at(data_dir, &bytes)?;
    Ok((path, Fingerprint::of(&bytes), bytes.len()))
}

pub(crate) fn fetch_with_retries(
    config: &SyncConfig,
    source: &dyn TableSource,
) -> Result<Vec<u8>, SyncError> {
    let policy = RetryPolicy::new(
        config.retry_count,
        Duration::from_secs(config.retry_backoff_seconds),
    );
    Ok(retry(&policy, |_| source.fetch_raw())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use courtsync_core::config::SourceFormat;
    use courtsync_core::Table;
    use courtsync_fetch::FetchError;
    use tempfile::TempDir;

    const CSV_V1: &[u8] = b"Team,Rank\nDuke,1\nUNC,2\nWake,3\n";
    const CSV_V2: &[u8] = b"Team,Rank\nDuke,1\nUNC,4\nWake,3\n";

    fn test_config() -> SyncConfig {
        SyncConfig {
            source_endpoint: "https://example.com/exportCSV.php".to_string(),
            source_format: SourceFormat::Csv,
            json_records_key: None,
            destination_sheet_id: "sheet-1".to_string(),
            destination_tab: "Ratings".to_string(),
            min_payload_bytes: 10,
            retry_count: 3,
            retry_backoff_seconds: 0,
            timeout_seconds: 30,
            token_env: "COURTSYNC_SHEETS_TOKEN".to_string(),
            token_file: None,
            season: Default::default(),
        }
    }

    fn in_season() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    /// Source returning scripted responses and counting calls.
    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<Vec<u8>, FetchError>>>,
        calls: Cell<usize>,
    }

    impl ScriptedSource {
        fn returning(bytes: &[u8]) -> Self {
            Self::with_responses(vec![Ok(bytes.to_vec())])
        }

        fn with_responses(responses: Vec<Result<Vec<u8>, FetchError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: Cell::new(0),
            }
        }
    }

    impl TableSource for ScriptedSource {
        fn fetch_raw(&self) -> Result<Vec<u8>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("source called more times than scripted"))
        }
    }

    /// Writer recording every replacement, optionally failing first.
    #[derive(Default)]
    struct RecordingWriter {
        replacements: RefCell<Vec<(SheetTarget, Table)>>,
        fail_with_status: Cell<Option<u16>>,
    }

    impl SheetWriter for RecordingWriter {
        fn replace(&self, target: &SheetTarget, table: &Table) -> Result<(), SyncError> {
            if let Some(status) = self.fail_with_status.take() {
                return Err(SyncError::Sheets {
                    operation: "update",
                    status,
                    body: "scripted failure".to_string(),
                });
            }
            self.replacements
                .borrow_mut()
                .push((target.clone(), table.clone()));
            Ok(())
        }
    }

    #[test]
    fn first_run_writes_and_records_state() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let source = ScriptedSource::returning(CSV_V1);
        let writer = RecordingWriter::default();

        let outcome = run(
            &config,
            dir.path(),
            &source,
            &writer,
            in_season(),
            RunOptions::default(),
        )
        .expect("run");

        assert_eq!(outcome, Outcome::Synced { rows: 3 });
        let replacements = writer.replacements.borrow();
        assert_eq!(replacements.len(), 1);
        assert_eq!(replacements[0].0.tab, "Ratings");
        assert_eq!(replacements[0].1.headers(), ["Team", "Rank"]);

        let record = state::load_at(dir.path()).expect("state");
        assert_eq!(record.last_run, Some(in_season()));
        assert_eq!(record.fingerprint, Some(Fingerprint::of(CSV_V1)));
    }

    #[test]
    fn unchanged_content_skips_the_write() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let writer = RecordingWriter::default();

        let first = ScriptedSource::returning(CSV_V1);
        run(&config, dir.path(), &first, &writer, in_season(), RunOptions::default()).unwrap();

        // Next day, identical bytes: fetched but not uploaded.
        let next_day = in_season().succ_opt().unwrap();
        let second = ScriptedSource::returning(CSV_V1);
        let outcome = run(
            &config,
            dir.path(),
            &second,
            &writer,
            next_day,
            RunOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(writer.replacements.borrow().len(), 1, "write happened once");
        // The unchanged day still advances the daily marker.
        let record = state::load_at(dir.path()).unwrap();
        assert_eq!(record.last_run, Some(next_day));
    }

    #[test]
    fn changed_content_triggers_a_full_rewrite() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let writer = RecordingWriter::default();

        run(
            &config,
            dir.path(),
            &ScriptedSource::returning(CSV_V1),
            &writer,
            in_season(),
            RunOptions::default(),
        )
        .unwrap();

        let next_day = in_season().succ_opt().unwrap();
        let outcome = run(
            &config,
            dir.path(),
            &ScriptedSource::returning(CSV_V2),
            &writer,
            next_day,
            RunOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Synced { rows: 3 });
        let replacements = writer.replacements.borrow();
        assert_eq!(replacements.len(), 2);
        assert_eq!(replacements[1].1.rows()[1], ["UNC", "4"]);

        let record = state::load_at(dir.path()).unwrap();
        assert_eq!(record.fingerprint, Some(Fingerprint::of(CSV_V2)));
        assert_ne!(Fingerprint::of(CSV_V1), Fingerprint::of(CSV_V2));
    }

    #[test]
    fn out_of_season_makes_zero_network_calls() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let source = ScriptedSource::with_responses(vec![]);
        let writer = RecordingWriter::default();

        let july = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();
        let outcome = run(&config, dir.path(), &source, &writer, july, RunOptions::default())
            .unwrap();

        assert_eq!(outcome, Outcome::OutOfSeason);
        assert_eq!(source.calls.get(), 0);
        assert!(writer.replacements.borrow().is_empty());
    }

    #[test]
    fn second_invocation_same_day_is_gated_before_the_network() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let writer = RecordingWriter::default();

        run(
            &config,
            dir.path(),
            &ScriptedSource::returning(CSV_V1),
            &writer,
            in_season(),
            RunOptions::default(),
        )
        .unwrap();

        let source = ScriptedSource::with_responses(vec![]);
        let outcome = run(
            &config,
            dir.path(),
            &source,
            &writer,
            in_season(),
            RunOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome, Outcome::AlreadyRanToday);
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn transient_fetch_errors_are_retried_to_success() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let writer = RecordingWriter::default();
        let source = ScriptedSource::with_responses(vec![
            Err(FetchError::Status {
                status: 503,
                url: "https://example.com/exportCSV.php".to_string(),
            }),
            Ok(CSV_V1.to_vec()),
        ]);

        let outcome = run(
            &config,
            dir.path(),
            &source,
            &writer,
            in_season(),
            RunOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Synced { rows: 3 });
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn permanent_fetch_error_fails_without_retry() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let writer = RecordingWriter::default();
        let source = ScriptedSource::with_responses(vec![Err(FetchError::Undersized {
            got: 42,
            min: 1000,
        })]);

        let err = run(
            &config,
            dir.path(),
            &source,
            &writer,
            in_season(),
            RunOptions::default(),
        )
        .unwrap_err();

        assert_eq!(source.calls.get(), 1);
        assert!(matches!(
            err,
            SyncError::Fetch(FetchError::Undersized { .. })
        ));
        assert!(writer.replacements.borrow().is_empty());
        assert_eq!(state::load_at(dir.path()).unwrap(), Default::default());
    }

    #[test]
    fn failed_write_leaves_run_record_untouched() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let writer = RecordingWriter::default();

        run(
            &config,
            dir.path(),
            &ScriptedSource::returning(CSV_V1),
            &writer,
            in_season(),
            RunOptions::default(),
        )
        .unwrap();
        let before = state::load_at(dir.path()).unwrap();

        writer.fail_with_status.set(Some(401));
        let next_day = in_season().succ_opt().unwrap();
        let err = run(
            &config,
            dir.path(),
            &ScriptedSource::returning(CSV_V2),
            &writer,
            next_day,
            RunOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::Sheets { status: 401, .. }));
        let after = state::load_at(dir.path()).unwrap();
        assert_eq!(after, before, "a failed upload must not advance state");

        // The retried sync next invocation goes through in full.
        let outcome = run(
            &config,
            dir.path(),
            &ScriptedSource::returning(CSV_V2),
            &writer,
            next_day,
            RunOptions::default(),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Synced { rows: 3 });
    }

    #[test]
    fn dry_run_reports_without_writing_or_advancing_state() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let writer = RecordingWriter::default();
        let options = RunOptions {
            dry_run: true,
            force: false,
        };

        let outcome = run(
            &config,
            dir.path(),
            &ScriptedSource::returning(CSV_V1),
            &writer,
            in_season(),
            options,
        )
        .unwrap();

        assert_eq!(outcome, Outcome::WouldSync { rows: 3 });
        assert!(writer.replacements.borrow().is_empty());
        assert_eq!(state::load_at(dir.path()).unwrap(), Default::default());
        assert_eq!(
            courtsync_fetch::snapshot::read_at(dir.path()).unwrap(),
            None,
            "dry-run must not touch the snapshot"
        );
    }

    #[test]
    fn force_bypasses_gates_but_not_the_fingerprint_skip() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let writer = RecordingWriter::default();
        let force = RunOptions {
            dry_run: false,
            force: true,
        };

        // Forced run out of season still syncs.
        let july = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();
        let outcome = run(
            &config,
            dir.path(),
            &ScriptedSource::returning(CSV_V1),
            &writer,
            july,
            force,
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Synced { rows: 3 });

        // Forced again the same day with identical bytes: fetches, but the
        // fingerprint still gates the upload.
        let outcome = run(
            &config,
            dir.path(),
            &ScriptedSource::returning(CSV_V1),
            &writer,
            july,
            force,
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(writer.replacements.borrow().len(), 1);
    }

    #[test]
    fn malformed_payload_is_fatal_before_any_write() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let writer = RecordingWriter::default();
        // Ragged: data row wider than the header.
        let source = ScriptedSource::returning(b"Team,Rank\nDuke,1,oops\n");

        let err = run(
            &config,
            dir.path(),
            &source,
            &writer,
            in_season(),
            RunOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::Table(_)));
        assert!(writer.replacements.borrow().is_empty());
        assert_eq!(state::load_at(dir.path()).unwrap(), Default::default());
    }

    #[test]
    fn fetch_snapshot_writes_the_snapshot_and_reports_fingerprint() {
        let dir = TempDir::new().unwrap();
        let config = test_config();
        let source = ScriptedSource::returning(CSV_V1);

        let (path, fingerprint, bytes) =
            fetch_snapshot(&config, dir.path(), &source).expect("fetch");

        assert!(path.ends_with("snapshot.csv"));
        assert_eq!(bytes, CSV_V1.len());
        assert_eq!(fingerprint, Fingerprint::of(CSV_V1));
        assert_eq!(std::fs::read(path).unwrap(), CSV_V1);
    }
}
