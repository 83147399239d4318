//! Domain types shared across the pipeline.
//!
//! The Fetcher and the Syncer only ever talk to each other through the value
//! types defined here, so either side can be swapped without touching the
//! other.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TableError;

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Lowercase hex SHA-256 digest of raw fetched bytes.
///
/// Used for change detection only; transit integrity is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digest `bytes` into a fingerprint.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened prefix for logs and status output.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// SheetTarget
// ---------------------------------------------------------------------------

/// Destination sheet, identified by spreadsheet ID and tab name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub tab: String,
}

impl SheetTarget {
    pub fn new(spreadsheet_id: impl Into<String>, tab: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            tab: tab.into(),
        }
    }
}

impl fmt::Display for SheetTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.spreadsheet_id, self.tab)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Rectangular all-text table: an ordered header plus ordered data rows.
///
/// Invariant: every row has exactly `headers.len()` cells. The only way to
/// build a `Table` is [`Table::from_rows`], which pads short rows with empty
/// strings and rejects rows wider than the header, so the invariant cannot be
/// broken from outside this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from a header and data rows.
    ///
    /// Rows shorter than the header are padded with empty cells (a missing
    /// value is an empty string, never absent). Rows wider than the header
    /// are a shape error. A table with no header or no data rows is an error.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        if headers.is_empty() || rows.is_empty() {
            return Err(TableError::Empty);
        }
        let width = headers.len();
        let mut padded = Vec::with_capacity(rows.len());
        for (index, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(TableError::RaggedRow {
                    row: index + 1,
                    expected: width,
                    got: row.len(),
                });
            }
            row.resize(width, String::new());
            padded.push(row);
        }
        Ok(Self {
            headers,
            rows: padded,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header row followed by data rows — the payload shape the destination
    /// values API takes.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.headers.clone());
        values.extend(self.rows.iter().cloned());
        values
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
