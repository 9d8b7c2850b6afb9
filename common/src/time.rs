//! Timestamp type used for rate validity and conversion dates.

use chrono::{DateTime, Utc};

/// A timestamp with timezone (always UTC for ratematch).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}
