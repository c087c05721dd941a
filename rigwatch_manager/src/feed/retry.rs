//! Retry with exponential backoff for feed requests
//!
//! The engine itself never retries; transient network failures are absorbed
//! here, in the feed client, before an error is surfaced.

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::time::Duration;

const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(5);
const BACKOFF_MULTIPLIER: f64 = 2.0;
const MAX_RETRIES: usize = 2;

/// Backoff schedule for repeated attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
    pub max_retries: usize,
    pub jitter: bool, // Spread out clients polling the same site
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
            multiplier: BACKOFF_MULTIPLIER,
            max_retries: MAX_RETRIES,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default backoff with a custom retry budget
    pub fn with_max_retries(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Short backoffs for tests
    pub fn testing() -> Self {
        Self {
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(10),
            multiplier: 2.0,
            max_retries: 3,
            jitter: false,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let Some(steps) = attempt.checked_sub(1) else {
            return Duration::ZERO;
        };

        let growth = self.multiplier.powi(steps.min(i32::MAX as usize) as i32);
        let delay = Duration::try_from_secs_f64(self.initial_backoff.as_secs_f64() * growth)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff));

        if self.jitter {
            delay.mul_f64(spread_factor())
        } else {
            delay
        }
    }

    /// Whether another attempt is allowed after `retries_done` retries
    pub fn should_retry(&self, retries_done: usize) -> bool {
        retries_done < self.max_retries
    }

    /// Sleep before retry number `attempt`
    pub async fn wait(&self, attempt: usize) {
        let delay = self.backoff_delay(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Multiplier in `[0.8, 1.2)`, different for each call
fn spread_factor() -> f64 {
    let seed = RandomState::new().hash_one(std::thread::current().id());
    0.8 + (seed % 400) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_increases() {
        let policy = RetryPolicy::testing();

        let delay1 = policy.backoff_delay(1);
        let delay2 = policy.backoff_delay(2);
        let delay3 = policy.backoff_delay(3);

        assert_eq!(policy.backoff_delay(0), Duration::ZERO);
        assert!(delay2 > delay1);
        assert!(delay3 > delay2);
    }

    #[test]
    fn test_backoff_caps_at_max() {
        let policy = RetryPolicy {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            max_retries: 10,
            jitter: false,
        };

        assert_eq!(policy.backoff_delay(100), Duration::from_secs(5));
        assert_eq!(policy.backoff_delay(usize::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy {
            jitter: true,
            ..RetryPolicy::testing()
        };
        let delay = policy.backoff_delay(3);
        assert!(delay >= Duration::from_micros(3100));
        assert!(delay <= Duration::from_micros(4900));
    }

    #[test]
    fn test_retry_budget() {
        let policy = RetryPolicy::with_max_retries(2);
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));

        assert!(!RetryPolicy::none().should_retry(0));
    }
}
