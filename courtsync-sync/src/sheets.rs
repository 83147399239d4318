//! Destination replacement over the Google Sheets values API.
//!
//! ## Write protocol
//!
//! `values:clear` followed by `values:update?valueInputOption=RAW` — a full
//! replacement, not a cell-by-cell diff. RAW stops the API from re-typing
//! cells, so text like `007` or `2026-01-05` lands verbatim. The two calls
//! are not atomic from an external reader's point of view: a reader polling
//! the tab mid-operation can observe an empty or partial state. That window
//! is accepted; concurrent *writers* are excluded by the scheduler.

use std::time::Duration;

use courtsync_core::{config::SyncConfig, SheetTarget, Table};
use serde_json::json;

use crate::error::SyncError;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// How much of an error response body to keep in the error.
const BODY_PREVIEW_BYTES: usize = 300;

/// Destination seam: make the target tab's visible content equal to `table`.
///
/// The REST client below is the production implementation; tests use
/// in-memory fakes, and dry runs use [`DiscardWriter`].
pub trait SheetWriter {
    fn replace(&self, target: &SheetTarget, table: &Table) -> Result<(), SyncError>;
}

// ---------------------------------------------------------------------------
// REST client
// ---------------------------------------------------------------------------

/// Google Sheets values-API client authenticated with a ready bearer token.
///
/// Token minting (service-account JWT exchange) happens out-of-band — the
/// scheduler exports the token via environment variable or drops it in the
/// configured token file.
pub struct SheetsClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl SheetsClient {
    pub fn new(token: String, timeout: Duration) -> Self {
        Self::with_base_url(token, timeout, DEFAULT_BASE_URL)
    }

    /// Point the client at a non-default API host (mock server, regional
    /// endpoint).
    pub fn with_base_url(token: String, timeout: Duration, base_url: impl Into<String>) -> Self {
        Self {
            agent: ureq::builder().timeout(timeout).build(),
            base_url: base_url.into(),
            token,
        }
    }

    /// Build a client from config, resolving the bearer token from the
    /// configured environment variable first, then the token file.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let token = resolve_token(config)?;
        Ok(Self::new(token, Duration::from_secs(config.timeout_seconds)))
    }

    fn clear(&self, target: &SheetTarget) -> Result<(), SyncError> {
        let url = format!(
            "{}/{}/values/{}:clear",
            self.base_url, target.spreadsheet_id, target.tab
        );
        self.send("clear", self.agent.post(&url), json!({}))
    }

    fn update(&self, target: &SheetTarget, table: &Table) -> Result<(), SyncError> {
        let url = format!(
            "{}/{}/values/{}?valueInputOption=RAW",
            self.base_url, target.spreadsheet_id, target.tab
        );
        let body = json!({
            "range": target.tab,
            "majorDimension": "ROWS",
            "values": table.to_values(),
        });
        self.send("update", self.agent.put(&url), body)
    }

    fn send(
        &self,
        operation: &'static str,
        request: ureq::Request,
        body: serde_json::Value,
    ) -> Result<(), SyncError> {
        let result = request
            .set("Authorization", &format!("Bearer {}", self.token))
            .send_json(body);
        match result {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(SyncError::Sheets {
                    operation,
                    status,
                    body: preview(&body),
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(SyncError::SheetsTransport {
                operation,
                detail: transport.to_string(),
            }),
        }
    }
}

impl SheetWriter for SheetsClient {
    fn replace(&self, target: &SheetTarget, table: &Table) -> Result<(), SyncError> {
        tracing::info!(
            "replacing {target} with {} data rows",
            table.row_count()
        );
        self.clear(target)?;
        self.update(target, table)
    }
}

// ---------------------------------------------------------------------------
// Dry-run writer
// ---------------------------------------------------------------------------

/// Writer that acknowledges without touching anything. Dry runs use this so
/// no token is needed; the pipeline returns before writing anyway.
pub struct DiscardWriter;

impl SheetWriter for DiscardWriter {
    fn replace(&self, target: &SheetTarget, table: &Table) -> Result<(), SyncError> {
        tracing::debug!(
            "discarding write of {} rows to {target}",
            table.row_count()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Token resolution
// ---------------------------------------------------------------------------

fn resolve_token(config: &SyncConfig) -> Result<String, SyncError> {
    if let Ok(token) = std::env::var(&config.token_env) {
        let token = token.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }
    if let Some(path) = &config.token_file {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::error::io_err(path, e))?;
        let token = contents.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }
    Err(SyncError::MissingToken {
        env: config.token_env.clone(),
    })
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_PREVIEW_BYTES {
        return trimmed.to_string();
    }
    let mut cut = BODY_PREVIEW_BYTES;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &trimmed[..cut])
}
