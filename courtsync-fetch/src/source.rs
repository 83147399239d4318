//! The retrieval-strategy seam.

use crate::error::FetchError;

/// A swappable strategy for obtaining raw tabular bytes.
///
/// Implementations must fail loudly — a non-success status, an undersized
/// body, or an incompatible content type is an error, never silently empty
/// bytes. Downstream consumers only ever see the returned bytes, so a
/// strategy can be replaced without touching them.
pub trait TableSource {
    fn fetch_raw(&self) -> Result<Vec<u8>, FetchError>;
}
