//! Clock abstraction
//!
//! Every computation that needs "now" receives it from a [`Clock`], so tests
//! can freeze time without touching process-wide state.

use crate::error::{RigwatchError, RigwatchResult};
use chrono::{DateTime, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Freeze the clock at an RFC 3339 timestamp
    pub fn parse(rfc3339: &str) -> RigwatchResult<Self> {
        let instant = DateTime::parse_from_rfc3339(rfc3339).map_err(|e| {
            RigwatchError::malformed(format!("invalid instant '{}': {}", rfc3339, e))
        })?;
        Ok(Self::new(instant.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_keeps_offset_instant() {
        let clock = FixedClock::parse("2015-12-03T14:20:25-08:00").unwrap();
        assert_eq!(clock.now().to_rfc3339(), "2015-12-03T22:20:25+00:00");
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_fixed_clock_rejects_garbage() {
        assert!(FixedClock::parse("yesterday").is_err());
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
