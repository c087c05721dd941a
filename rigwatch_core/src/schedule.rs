//! Daily basal schedule lookup
//!
//! A schedule is a table of `(time of day, rate)` entries covering one day in
//! a named timezone. The rate at any instant is the one from the latest entry
//! starting at or before the local time of day; instants earlier than the
//! first entry carry over the last entry of the previous day.

use crate::error::{RigwatchError, RigwatchResult};
use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;

/// One row of the daily schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasalEntry {
    /// Local time of day the rate takes effect
    pub start: NaiveTime,
    /// Rate in units/hour
    pub rate: f64,
}

impl BasalEntry {
    pub fn new(start: NaiveTime, rate: f64) -> Self {
        Self { start, rate }
    }

    /// Build an entry from the feed's `"HH:MM"` time and rate
    pub fn parse(time: &str, rate: f64) -> RigwatchResult<Self> {
        let start = NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|e| {
                RigwatchError::invalid_schedule(format!("bad entry time '{}': {}", time, e))
            })?;
        Ok(Self::new(start, rate))
    }
}

/// Immutable daily schedule in a single timezone
#[derive(Debug, Clone, PartialEq)]
pub struct BasalSchedule {
    timezone: Tz,
    entries: Vec<BasalEntry>,
}

impl BasalSchedule {
    /// Build a schedule, sorting entries by start time
    ///
    /// Fails when there are no entries, when two entries share a start time or
    /// when a rate is not a finite, non-negative number.
    pub fn new(timezone: Tz, mut entries: Vec<BasalEntry>) -> RigwatchResult<Self> {
        if entries.is_empty() {
            return Err(RigwatchError::invalid_schedule("schedule has no entries"));
        }

        if let Some(bad) = entries.iter().find(|e| !e.rate.is_finite() || e.rate < 0.0) {
            return Err(RigwatchError::invalid_schedule(format!(
                "entry at {} has invalid rate {}",
                bad.start.format("%H:%M"),
                bad.rate
            )));
        }

        entries.sort_by_key(|e| e.start);
        if let Some(pair) = entries.windows(2).find(|w| w[0].start == w[1].start) {
            return Err(RigwatchError::invalid_schedule(format!(
                "duplicate entry at {}",
                pair[0].start.format("%H:%M")
            )));
        }

        Ok(Self { timezone, entries })
    }

    /// Build a schedule from an IANA timezone name
    pub fn with_timezone_name(timezone: &str, entries: Vec<BasalEntry>) -> RigwatchResult<Self> {
        let tz: Tz = timezone.parse().map_err(|e| {
            RigwatchError::invalid_schedule(format!("unknown timezone '{}': {}", timezone, e))
        })?;
        Self::new(tz, entries)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn entries(&self) -> &[BasalEntry] {
        &self.entries
    }

    /// Scheduled rate in effect at `instant`
    pub fn rate_at(&self, instant: DateTime<Utc>) -> f64 {
        self.entry_at(instant).rate
    }

    /// Schedule entry in effect at `instant`
    pub fn entry_at(&self, instant: DateTime<Utc>) -> &BasalEntry {
        let time_of_day = instant.with_timezone(&self.timezone).time();
        let after = self.entries.partition_point(|e| e.start <= time_of_day);

        // `new` guarantees at least one entry
        match after.checked_sub(1) {
            Some(idx) => &self.entries[idx],
            None => &self.entries[self.entries.len() - 1],
        }
    }
}
