//! # courtsync-sync
//!
//! The Syncer: decode fetched bytes into a [`courtsync_core::Table`], compare
//! the content fingerprint against the previous run, and — only when it
//! changed — replace the destination tab (clear, then write).
//!
//! Call [`pipeline::run`] for the full gate → fetch → compare → replace
//! sequence.

pub mod decode;
pub mod diff;
pub mod error;
pub mod pipeline;
pub mod sheets;
pub mod state;

pub use error::SyncError;
pub use pipeline::{run, Outcome, RunOptions};
pub use sheets::{DiscardWriter, SheetWriter, SheetsClient};
