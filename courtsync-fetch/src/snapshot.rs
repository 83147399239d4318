//! Durable snapshot of the last fetched raw bytes.
//!
//! The snapshot lets re-runs after a downstream failure inspect what was
//! fetched, and feeds the diff preview. It is a disposable optimization:
//! re-fetch is the correctness baseline, and deleting the file costs nothing
//! but a re-download.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, FetchError};

/// `<data_dir>/snapshot.csv` — pure, no I/O.
pub fn snapshot_path_at(data_dir: &Path) -> PathBuf {
    data_dir.join("snapshot.csv")
}

/// Atomically write the fetched bytes to the snapshot file.
///
/// Writes to `snapshot.csv.tmp` then renames; a failed write never leaves a
/// truncated snapshot behind.
pub fn write_at(data_dir: &Path, bytes: &[u8]) -> Result<PathBuf, FetchError> {
    std::fs::create_dir_all(data_dir).map_err(|e| io_err(data_dir, e))?;
    let path = snapshot_path_at(data_dir);
    let tmp = path.with_extension("csv.tmp");
    std::fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(path)
}

/// Read the snapshot back, or `None` if no snapshot exists yet.
pub fn read_at(data_dir: &Path) -> Result<Option<Vec<u8>>, FetchError> {
    let path = snapshot_path_at(data_dir);
    match std::fs::read(&path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(&path, err)),
    }
}
