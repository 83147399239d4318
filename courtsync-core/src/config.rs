//! YAML configuration persistence.
//!
//! # Storage layout
//!
//! ```text
//! ~/.courtsync/
//!   config.yaml      (mode 0600, created by `courtsync init`)
//!   last_run.txt     (run record — written by the sync pipeline)
//!   fingerprint.txt  (run record — written by the sync pipeline)
//!   snapshot.csv     (last fetched raw bytes)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::season::SeasonWindow;

// ---------------------------------------------------------------------------
// Source format
// ---------------------------------------------------------------------------

/// Payload shape the upstream endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// CSV document: header row + data rows.
    #[default]
    Csv,
    /// JSON document holding a list of uniform records, optionally under a key.
    Json,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "csv"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

/// Explicit configuration for one sync pipeline, passed in at construction.
///
/// The destination tab name is used verbatim in the values-API URL path, so
/// it must be URL-safe (letters, digits, `_`, `-`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// HTTP(S) endpoint returning the ratings table.
    pub source_endpoint: String,

    #[serde(default)]
    pub source_format: SourceFormat,

    /// JSON key holding the record list (`source_format: json` only).
    /// Absent means the document root is the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_records_key: Option<String>,

    pub destination_sheet_id: String,
    pub destination_tab: String,

    /// Bodies smaller than this are an error page, not data.
    #[serde(default = "default_min_payload_bytes")]
    pub min_payload_bytes: u64,

    /// Bounded attempts for transient fetch failures.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Fixed sleep between attempts.
    #[serde(default = "default_retry_backoff_seconds")]
    pub retry_backoff_seconds: u64,

    /// Per-request timeout for fetch and destination calls.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Environment variable holding a ready bearer token for the destination.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Fallback file holding the bearer token, consulted when the
    /// environment variable is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,

    #[serde(default)]
    pub season: SeasonWindow,
}

fn default_min_payload_bytes() -> u64 {
    1000
}
fn default_retry_count() -> u32 {
    3
}
fn default_retry_backoff_seconds() -> u64 {
    5
}
fn default_timeout_seconds() -> u64 {
    90
}
fn default_token_env() -> String {
    "COURTSYNC_SHEETS_TOKEN".to_string()
}

impl SyncConfig {
    /// Reject values that parsed but cannot drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_endpoint.trim().is_empty() {
            return Err(invalid("source_endpoint is empty"));
        }
        if self.destination_sheet_id.trim().is_empty() {
            return Err(invalid("destination_sheet_id is empty"));
        }
        if self.destination_tab.trim().is_empty() {
            return Err(invalid("destination_tab is empty"));
        }
        if self.retry_count == 0 {
            return Err(invalid("retry_count must be at least 1"));
        }
        if self.timeout_seconds == 0 {
            return Err(invalid("timeout_seconds must be at least 1"));
        }
        self.season.validate()
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.courtsync/` — config, run record, and snapshot all live here.
pub fn data_dir_at(home: &Path) -> PathBuf {
    home.join(".courtsync")
}

/// `<home>/.courtsync/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    data_dir_at(home).join("config.yaml")
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load and validate the config at `<home>/.courtsync/config.yaml`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<SyncConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: SyncConfig =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
    config.validate()?;
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<SyncConfig, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the config to `<home>/.courtsync/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem).
pub fn save_at(home: &Path, config: &SyncConfig) -> Result<(), ConfigError> {
    let dir = data_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp = path.with_file_name("config.yaml.tmp");

    let yaml = format!(
        "# courtsync configuration\n# Bearer token: export ${} or point token_file at a readable token.\n{}",
        config.token_env,
        serde_yaml::to_string(config)?
    );
    std::fs::write(&tmp, yaml)?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &SyncConfig) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Scaffold a config with defaults for everything but the identifying fields.
///
/// Idempotent: if a config already exists it is loaded and returned unchanged,
/// with `created = false`.
pub fn init_at(
    home: &Path,
    source_endpoint: String,
    source_format: SourceFormat,
    json_records_key: Option<String>,
    destination_sheet_id: String,
    destination_tab: String,
) -> Result<(SyncConfig, bool), ConfigError> {
    if config_path_at(home).exists() {
        return Ok((load_at(home)?, false));
    }

    let config = SyncConfig {
        source_endpoint,
        source_format,
        json_records_key,
        destination_sheet_id,
        destination_tab,
        min_payload_bytes: default_min_payload_bytes(),
        retry_count: default_retry_count(),
        retry_backoff_seconds: default_retry_backoff_seconds(),
        timeout_seconds: default_timeout_seconds(),
        token_env: default_token_env(),
        token_file: None,
        season: SeasonWindow::default(),
    };
    config.validate()?;
    save_at(home, &config)?;
    Ok((config, true))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
