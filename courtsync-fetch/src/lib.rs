//! # courtsync-fetch
//!
//! The Fetcher: obtain raw tabular bytes from an upstream endpoint, validate
//! them, and snapshot them durably. The retrieval strategy lives behind
//! [`TableSource`] so it can be swapped (plain GET today, paginated API or a
//! rendered-page scrape tomorrow) without touching the Syncer.

pub mod error;
pub mod http;
pub mod retry;
pub mod snapshot;
pub mod source;

pub use error::FetchError;
pub use http::HttpSource;
pub use retry::{retry, RetryPolicy};
pub use source::TableSource;
