//! Season-window predicate.
//!
//! The pipeline only runs during the configured calendar window. The default
//! window is Nov 1 through Apr 10 inclusive, which spans a year boundary:
//! Nov–Dec belong to the season ending the following April, Jan–Apr to the
//! season that started the previous November.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inclusive month/day window, possibly wrapping over the year boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindow {
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
}

impl Default for SeasonWindow {
    fn default() -> Self {
        Self {
            start_month: 11,
            start_day: 1,
            end_month: 4,
            end_day: 10,
        }
    }
}

impl SeasonWindow {
    /// Whether `date` falls inside the window, boundaries included.
    ///
    /// Comparison is on (month, day) pairs, so the predicate is total — no
    /// per-year date construction, no leap-day edge.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let md = (date.month(), date.day());
        let start = (self.start_month, self.start_day);
        let end = (self.end_month, self.end_day);
        if start <= end {
            start <= md && md <= end
        } else {
            // Wrapping window: inside from start to Dec 31, or Jan 1 to end.
            md >= start || md <= end
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (label, month, day) in [
            ("season start", self.start_month, self.start_day),
            ("season end", self.end_month, self.end_day),
        ] {
            if !(1..=12).contains(&month) {
                return Err(ConfigError::Invalid {
                    reason: format!("{label} month {month} is out of range 1..=12"),
                });
            }
            if !(1..=31).contains(&day) {
                return Err(ConfigError::Invalid {
                    reason: format!("{label} day {day} is out of range 1..=31"),
                });
            }
        }
        Ok(())
    }
}
