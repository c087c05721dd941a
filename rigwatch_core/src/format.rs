//! Display strings
//!
//! Pure rendering over already-resolved values. Nothing here fetches data or
//! reads the clock.

use crate::calibration::{Calibration, GlucoseUnit, SensorNoise, SensorSample};
use crate::recency::DeviceStatus;
use crate::temp_basal::BasalStatus;
use chrono::{DateTime, Utc};

/// Shown in place of a value that is too old to trust
pub const STALE_PLACEHOLDER: &str = "-";

/// Render a rate with at most two decimals and no trailing zeros
///
/// `0.650` becomes `"0.65"`, `1.0` becomes `"1"`, `-0.001` becomes `"0"`.
pub fn format_rate(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// `"0u/h -0.65 (8)"` for a running temp basal, `"0.65u/h"` otherwise
pub fn format_basal(status: &BasalStatus) -> String {
    match status {
        BasalStatus::Active {
            rate,
            diff,
            age_minutes,
        } => format!(
            "{}u/h {} ({})",
            format_rate(*rate),
            format_rate(*diff),
            age_minutes
        ),
        BasalStatus::Scheduled { rate } => format!("{}u/h", format_rate(*rate)),
    }
}

/// `"Rig 37%"` when the status is recent enough, `"-"` otherwise
pub fn format_battery(
    status: Option<&DeviceStatus>,
    now: DateTime<Utc>,
    threshold_seconds: i64,
) -> String {
    match status {
        Some(s) if s.is_recent(now, threshold_seconds) => format!("Rig {}%", s.battery_percent),
        _ => STALE_PLACEHOLDER.to_string(),
    }
}

/// Noise label of the newest sample followed by one raw value per sample
///
/// `samples` must be ordered oldest first; values are printed in that order.
pub fn format_raw(samples: &[SensorSample], calibration: &Calibration, unit: GlucoseUnit) -> String {
    let noise = SensorNoise::from_code(samples.last().and_then(|s| s.noise));

    let mut parts = Vec::with_capacity(samples.len() + 1);
    parts.push(noise.label().to_string());
    parts.extend(
        samples
            .iter()
            .map(|s| unit.render(calibration.raw_value(s))),
    );
    parts.join(" ")
}

/// Compact age label for the connection indicator
///
/// Minutes below an hour, then `1h<minutes>`, then whole hours up to six
/// hours, then `!`.
pub fn staleness_label(staleness_seconds: i64) -> String {
    let minutes = staleness_seconds.max(0) / 60;
    if minutes < 60 {
        format!("{}", minutes)
    } else if minutes < 120 {
        format!("1h{}", minutes - 60)
    } else if minutes / 60 <= 6 {
        format!("{}hr", minutes / 60)
    } else {
        "!".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_format_rate_strips_zeros() {
        assert_eq!(format_rate(0.0), "0");
        assert_eq!(format_rate(0.65), "0.65");
        assert_eq!(format_rate(0.5), "0.5");
        assert_eq!(format_rate(1.0), "1");
        assert_eq!(format_rate(1.234), "1.23");
        assert_eq!(format_rate(10.0), "10");
        assert_eq!(format_rate(-0.65), "-0.65");
        assert_eq!(format_rate(-0.001), "0");
        assert_eq!(format_rate(0.0 - 0.0), "0");
    }

    #[test]
    fn test_format_basal_variants() {
        let active = BasalStatus::Active {
            rate: 0.0,
            diff: -0.65,
            age_minutes: 8,
        };
        assert_eq!(format_basal(&active), "0u/h -0.65 (8)");

        let higher = BasalStatus::Active {
            rate: 1.2,
            diff: 0.55,
            age_minutes: 0,
        };
        assert_eq!(format_basal(&higher), "1.2u/h 0.55 (0)");

        assert_eq!(format_basal(&BasalStatus::Scheduled { rate: 0.65 }), "0.65u/h");
    }

    #[test]
    fn test_format_battery() {
        let status = DeviceStatus::new(37, instant("2015-12-04T01:05:18.994Z"));
        let now = instant("2015-12-04T01:25:18.994Z");

        assert_eq!(format_battery(Some(&status), now, 1800), "Rig 37%");
        assert_eq!(format_battery(Some(&status), now, 60), "-");
        assert_eq!(format_battery(None, now, 1800), "-");
    }

    #[test]
    fn test_format_raw_uses_newest_noise() {
        let cal = Calibration {
            observed_at: Utc.timestamp_millis_opt(1449309612000).unwrap(),
            slope: 786.670463685642,
            intercept: 27370.3970783194,
            scale: 1.0,
        };
        let samples = [
            SensorSample {
                observed_at: Utc.timestamp_millis_opt(1449534904000).unwrap(),
                sgv: 153.0,
                filtered: 186240.0,
                unfiltered: 178528.0,
                noise: Some(1),
            },
            SensorSample {
                observed_at: Utc.timestamp_millis_opt(1449535203000).unwrap(),
                sgv: 146.0,
                filtered: 180352.0,
                unfiltered: 172672.0,
                noise: Some(3),
            },
        ];

        assert_eq!(format_raw(&samples, &cal, GlucoseUnit::MgDl), "Med 146 139");
        assert_eq!(format_raw(&samples, &cal, GlucoseUnit::Mmol), "Med 8.1 7.7");
        assert_eq!(format_raw(&[], &cal, GlucoseUnit::MgDl), "---");
    }

    #[test]
    fn test_staleness_label() {
        assert_eq!(staleness_label(0), "0");
        assert_eq!(staleness_label(59 * 60 + 59), "59");
        assert_eq!(staleness_label(60 * 60), "1h0");
        assert_eq!(staleness_label(119 * 60), "1h59");
        assert_eq!(staleness_label(2 * 3600), "2hr");
        assert_eq!(staleness_label(6 * 3600 + 59 * 60), "6hr");
        assert_eq!(staleness_label(7 * 3600), "!");
        assert_eq!(staleness_label(-30), "0");
    }
}
