//! Named constants used while resolving status lines
//!
//! Thresholds live here rather than in the per-call display options so that
//! a deployment tunes them once.

use serde::{Deserialize, Serialize};

/// mg/dL per mmol/L used for display conversion
pub const MMOL_PER_MGDL_DIVISOR: f64 = 18.0;

pub const DEFAULT_DEVICE_STATUS_RECENCY_THRESHOLD_SECONDS: i64 = 1800;
pub const DEFAULT_SENSOR_STALENESS_THRESHOLD_SECONDS: i64 = 600;
pub const DEFAULT_RAW_SAMPLE_COUNT: usize = 2;
pub const DEFAULT_TREATMENT_COUNT: usize = 10;

/// Thresholds and fetch sizes for the status engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConstants {
    /// Oldest uploader status, in seconds, still shown as battery level
    pub device_status_recency_threshold_seconds: i64,
    /// Sensor data older than this, in seconds, is flagged as stale
    pub sensor_staleness_threshold_seconds: i64,
    /// Number of sensor samples listed in the raw line
    pub raw_sample_count: usize,
    /// Number of recent treatments searched for the latest temp basal
    pub treatment_count: usize,
}

impl Default for StatusConstants {
    fn default() -> Self {
        Self {
            device_status_recency_threshold_seconds:
                DEFAULT_DEVICE_STATUS_RECENCY_THRESHOLD_SECONDS,
            sensor_staleness_threshold_seconds: DEFAULT_SENSOR_STALENESS_THRESHOLD_SECONDS,
            raw_sample_count: DEFAULT_RAW_SAMPLE_COUNT,
            treatment_count: DEFAULT_TREATMENT_COUNT,
        }
    }
}

impl StatusConstants {
    pub fn with_device_status_threshold(mut self, seconds: i64) -> Self {
        self.device_status_recency_threshold_seconds = seconds;
        self
    }

    pub fn with_raw_sample_count(mut self, count: usize) -> Self {
        self.raw_sample_count = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let constants = StatusConstants::default();
        assert_eq!(constants.device_status_recency_threshold_seconds, 1800);
        assert_eq!(constants.sensor_staleness_threshold_seconds, 600);
        assert_eq!(constants.raw_sample_count, 2);
        assert_eq!(constants.treatment_count, 10);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let constants: StatusConstants =
            serde_json::from_str(r#"{"raw_sample_count": 3}"#).unwrap();
        assert_eq!(constants.raw_sample_count, 3);
        assert_eq!(constants.device_status_recency_threshold_seconds, 1800);
    }

    #[test]
    fn test_builders() {
        let constants = StatusConstants::default()
            .with_device_status_threshold(60)
            .with_raw_sample_count(4);
        assert_eq!(constants.device_status_recency_threshold_seconds, 60);
        assert_eq!(constants.raw_sample_count, 4);
    }
}
