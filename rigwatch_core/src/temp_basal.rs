//! Temporary basal override tracking
//!
//! A temp basal replaces the scheduled rate for a bounded window. While the
//! window is open the display shows the temp rate, its difference from the
//! scheduled rate at the moment it started, and how many minutes ago it
//! started. Once the window closes the schedule is shown again.

use crate::schedule::BasalSchedule;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// A time-bounded override of the scheduled rate
#[derive(Debug, Clone, PartialEq)]
pub struct TempBasal {
    pub started_at: DateTime<Utc>,
    /// Planned rate in units/hour
    pub rate: f64,
    pub duration: Duration,
}

impl TempBasal {
    pub fn new(started_at: DateTime<Utc>, rate: f64, duration: Duration) -> Self {
        Self {
            started_at,
            rate,
            duration,
        }
    }

    pub fn from_minutes(started_at: DateTime<Utc>, rate: f64, minutes: i64) -> Self {
        let duration = Duration::try_minutes(minutes).unwrap_or(Duration::MAX);
        Self::new(started_at, rate, duration)
    }

    /// First instant at which the override no longer applies
    ///
    /// `None` when the window ends past the last representable instant.
    pub fn active_until(&self) -> Option<DateTime<Utc>> {
        self.started_at.checked_add_signed(self.duration)
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.active_until().map_or(true, |until| now < until)
    }

    /// Whole minutes elapsed since the override started, rounded down
    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.started_at)
            .num_seconds()
            .div_euclid(60)
    }
}

/// Basal delivery as it should be displayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BasalStatus {
    /// A temp basal is running
    Active {
        rate: f64,
        /// Temp rate minus the scheduled rate when the temp started
        diff: f64,
        age_minutes: i64,
    },
    /// The schedule applies
    Scheduled { rate: f64 },
}

impl BasalStatus {
    /// Rate currently being delivered
    pub fn rate(&self) -> f64 {
        match self {
            BasalStatus::Active { rate, .. } | BasalStatus::Scheduled { rate } => *rate,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, BasalStatus::Active { .. })
    }
}

/// Resolve the displayed basal from the schedule and the most recent temp basal
pub fn current_basal_status(
    schedule: &BasalSchedule,
    latest: Option<&TempBasal>,
    now: DateTime<Utc>,
) -> BasalStatus {
    match latest {
        Some(temp) if temp.is_active_at(now) => {
            let scheduled = schedule.rate_at(temp.started_at);
            BasalStatus::Active {
                rate: temp.rate,
                diff: temp.rate - scheduled,
                age_minutes: temp.age_minutes(now),
            }
        }
        Some(temp) => {
            debug!(
                "Temp basal from {} lapsed after {} minutes",
                temp.started_at,
                temp.duration.num_minutes()
            );
            BasalStatus::Scheduled {
                rate: schedule.rate_at(now),
            }
        }
        None => BasalStatus::Scheduled {
            rate: schedule.rate_at(now),
        },
    }
}
