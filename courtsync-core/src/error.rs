//! Error types for courtsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.courtsync/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config YAML file did not exist at the expected path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// A field value that parsed but cannot be used.
    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

/// Rectangularity violations while building a [`crate::Table`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// No header or no data rows.
    #[error("table is empty (no header or no data rows)")]
    Empty,

    /// A data row is wider than the header.
    #[error("row {row} has {got} cells but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },
}
