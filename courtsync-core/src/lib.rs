//! Courtsync core library — domain types, configuration, season gate, errors.
//!
//! Public API surface:
//! - [`types`] — [`Table`], [`Fingerprint`], [`SheetTarget`]
//! - [`config`] — YAML configuration load / save / init
//! - [`season`] — the season-window predicate
//! - [`error`] — [`ConfigError`], [`TableError`]

pub mod config;
pub mod error;
pub mod season;
pub mod types;

pub use config::{SourceFormat, SyncConfig};
pub use error::{ConfigError, TableError};
pub use season::SeasonWindow;
pub use types::{Fingerprint, SheetTarget, Table};
