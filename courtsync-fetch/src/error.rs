//! Error types for courtsync-fetch.
//!
//! The taxonomy the retry helper relies on: transient failures (timeouts,
//! 5xx, connection resets) are worth another attempt; permanent failures
//! (4xx, undersized or non-tabular payloads) are surfaced immediately.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while fetching raw table bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream returned a non-success HTTP status.
    #[error("GET {url} returned status {status}")]
    Status { status: u16, url: String },

    /// The request never completed: timeout, DNS failure, connection reset.
    #[error("transport error for {url}: {detail}")]
    Transport { url: String, detail: String },

    /// Body below the plausible minimum — an error page, not real data.
    #[error("payload is {got} bytes, below the {min}-byte minimum")]
    Undersized { got: u64, min: u64 },

    /// Content type incompatible with tabular data.
    #[error("upstream returned '{content_type}' instead of tabular data")]
    ContentType { content_type: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every allowed attempt failed with a transient error.
    #[error("fetch failed after {attempts} attempt(s): {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Transport { .. } => true,
            _ => false,
        }
    }
}

/// Convenience constructor for [`FetchError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.into(),
        source,
    }
}
