//! Error types for courtsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use courtsync_core::error::{ConfigError, TableError};
use courtsync_fetch::FetchError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the fetch layer.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// An error from configuration loading.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Parsed rows violate the rectangular-table invariant.
    #[error("table shape error: {0}")]
    Table(#[from] TableError),

    /// CSV decode failure.
    #[error("CSV decode error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON that failed to parse at all.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON that parsed but is not a list of uniform records.
    #[error("unexpected JSON shape: {reason}")]
    JsonShape { reason: String },

    /// Destination API rejected a call.
    #[error("sheets {operation} failed with status {status}: {body}")]
    Sheets {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Destination API was unreachable.
    #[error("sheets {operation} transport error: {detail}")]
    SheetsTransport {
        operation: &'static str,
        detail: String,
    },

    /// No bearer token available for the destination.
    #[error("no sheets token: set ${env} or configure token_file")]
    MissingToken { env: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
