//! Staleness checks for timestamped samples

use chrono::{DateTime, Duration, Utc};

/// Latest uploader status reported to the feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceStatus {
    pub battery_percent: u8,
    pub observed_at: DateTime<Utc>,
}

impl DeviceStatus {
    pub fn new(battery_percent: u8, observed_at: DateTime<Utc>) -> Self {
        Self {
            battery_percent,
            observed_at,
        }
    }

    pub fn is_recent(&self, now: DateTime<Utc>, threshold_seconds: i64) -> bool {
        is_recent(self.observed_at, now, threshold_seconds)
    }
}

/// True when `observed_at` is no more than `threshold_seconds` before `now`
///
/// The boundary is inclusive and samples from the future count as recent.
/// A threshold too large to represent accepts every sample; one too far
/// below zero accepts none.
pub fn is_recent(observed_at: DateTime<Utc>, now: DateTime<Utc>, threshold_seconds: i64) -> bool {
    match Duration::try_seconds(threshold_seconds) {
        Some(threshold) => now.signed_duration_since(observed_at) <= threshold,
        None => threshold_seconds > 0,
    }
}

/// Seconds elapsed between `observed_at` and `now`, never negative
pub fn age_seconds(observed_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(observed_at).num_seconds().max(0)
}
