//! Store-generated timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-generated timestamp as the document store represents it:
/// seconds since the Unix epoch plus a nanosecond component.
///
/// Bookings are sorted most-recent-first by [`StoreTimestamp::seconds`];
/// a missing timestamp sorts as zero (oldest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreTimestamp {
    /// Seconds since the Unix epoch.
    pub seconds: i64,
    /// Nanosecond component.
    #[serde(default)]
    pub nanos: u32,
}

impl StoreTimestamp {
    /// Create a timestamp from epoch seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    /// The current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos(),
        }
    }

    /// Convert to a [`DateTime<Utc>`], when representable.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }
}
