//! Feed document parsing
//!
//! Converts the JSON documents returned by a [`FeedClient`](crate::feed::FeedClient)
//! into the engine's domain types. Only the fields the engine reads are
//! looked at; everything else in a document is ignored.

use crate::calibration::{Calibration, SensorSample};
use crate::error::{RigwatchError, RigwatchResult};
use crate::recency::DeviceStatus;
use crate::schedule::{BasalEntry, BasalSchedule};
use crate::temp_basal::TempBasal;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

const TEMP_BASAL_EVENT: &str = "Temp Basal";

/// A number the feed sometimes sends as a string (e.g. `"0.45"`)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn to_f64(&self, field: &str) -> RigwatchResult<f64> {
        match self {
            Numeric::Number(n) => Ok(*n),
            Numeric::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                RigwatchError::malformed(format!("field '{}' is not numeric: '{}'", field, s))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileDoc {
    #[serde(rename = "defaultProfile")]
    default_profile: Option<String>,
    #[serde(default)]
    store: HashMap<String, ProfileBody>,
    #[serde(flatten)]
    inline: ProfileBody,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileBody {
    timezone: Option<String>,
    #[serde(default)]
    basal: Vec<BasalDoc>,
}

#[derive(Debug, Deserialize)]
struct BasalDoc {
    time: String,
    value: Numeric,
}

#[derive(Debug, Deserialize)]
struct TreatmentDoc {
    #[serde(rename = "eventType")]
    event_type: Option<String>,
    created_at: Option<String>,
    rate: Option<Numeric>,
    absolute: Option<Numeric>,
    duration: Option<Numeric>,
}

#[derive(Debug, Deserialize)]
struct DeviceStatusDoc {
    created_at: String,
    #[serde(rename = "uploaderBattery")]
    uploader_battery: Option<Numeric>,
}

#[derive(Debug, Deserialize)]
struct SgvDoc {
    date: f64,
    #[serde(rename = "type")]
    kind: Option<String>,
    sgv: Option<Numeric>,
    filtered: Option<Numeric>,
    unfiltered: Option<Numeric>,
    noise: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CalDoc {
    date: f64,
    slope: Numeric,
    intercept: Numeric,
    scale: Numeric,
}

fn parse_array<T: DeserializeOwned>(doc: Value, what: &str) -> RigwatchResult<Vec<T>> {
    serde_json::from_value(doc)
        .map_err(|e| RigwatchError::malformed(format!("{} document: {}", what, e)))
}

/// Parse a feed timestamp such as `2015-12-03T14:12:25-08:00`,
/// `2015-12-04T01:05:18.994Z` or `2015-10-22T17:58-0700`
///
/// Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> RigwatchResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"] {
        if let Ok(ts) = DateTime::<FixedOffset>::parse_from_str(raw, fmt) {
            return Ok(ts.with_timezone(&Utc));
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(RigwatchError::malformed(format!("unrecognized timestamp '{}'", raw)))
}

/// Convert epoch milliseconds as sent in `date` fields
pub fn from_epoch_millis(millis: f64) -> RigwatchResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .ok_or_else(|| RigwatchError::malformed(format!("epoch millis out of range: {}", millis)))
}

/// Basal schedule of the current profile (first document in the feed)
pub fn parse_schedule(doc: Value) -> RigwatchResult<BasalSchedule> {
    let profiles: Vec<ProfileDoc> = parse_array(doc, "profile")?;
    let mut profile = profiles
        .into_iter()
        .next()
        .ok_or(RigwatchError::MissingRecord("profile"))?;

    let body = match profile.default_profile.take() {
        Some(name) => profile.store.remove(&name).ok_or_else(|| {
            RigwatchError::invalid_schedule(format!("default profile '{}' not in store", name))
        })?,
        None => profile.inline,
    };

    let timezone = body
        .timezone
        .ok_or_else(|| RigwatchError::invalid_schedule("profile has no timezone"))?;

    let entries = body
        .basal
        .iter()
        .map(|b| {
            let rate = b
                .value
                .to_f64("basal.value")
                .map_err(|e| RigwatchError::invalid_schedule(e.to_string()))?;
            BasalEntry::parse(&b.time, rate)
        })
        .collect::<RigwatchResult<Vec<_>>>()?;

    BasalSchedule::with_timezone_name(&timezone, entries)
}

/// Most recently created temp basal among the treatments, if any
///
/// Every `Temp Basal` entry must carry a timestamp, a rate and a duration
/// that fits on the calendar; one bad entry fails the whole document.
pub fn parse_latest_temp_basal(doc: Value) -> RigwatchResult<Option<TempBasal>> {
    let treatments: Vec<TreatmentDoc> = parse_array(doc, "treatments")?;

    let temps = treatments
        .iter()
        .filter(|t| t.event_type.as_deref() == Some(TEMP_BASAL_EVENT))
        .map(parse_temp_basal)
        .collect::<RigwatchResult<Vec<_>>>()?;

    // Earliest listed wins a tie on creation time
    Ok(temps
        .into_iter()
        .reduce(|latest, t| if t.started_at > latest.started_at { t } else { latest }))
}

fn parse_temp_basal(t: &TreatmentDoc) -> RigwatchResult<TempBasal> {
    let created_at = t
        .created_at
        .as_deref()
        .ok_or_else(|| RigwatchError::malformed("temp basal without created_at"))?;
    let started_at = parse_timestamp(created_at)?;

    let rate = t
        .rate
        .as_ref()
        .or(t.absolute.as_ref())
        .ok_or_else(|| RigwatchError::malformed("temp basal without rate"))?
        .to_f64("rate")?;
    let minutes = t
        .duration
        .as_ref()
        .ok_or_else(|| RigwatchError::malformed("temp basal without duration"))?
        .to_f64("duration")?;

    Ok(TempBasal::new(started_at, rate, temp_duration(started_at, minutes)?))
}

fn temp_duration(started_at: DateTime<Utc>, minutes: f64) -> RigwatchResult<Duration> {
    let out_of_range = || RigwatchError::malformed(format!("temp basal duration {} out of range", minutes));

    let millis = minutes * 60_000.0;
    if !millis.is_finite() || millis < 0.0 || millis >= i64::MAX as f64 {
        return Err(out_of_range());
    }

    let duration = Duration::try_milliseconds(millis.round() as i64).ok_or_else(out_of_range)?;
    started_at
        .checked_add_signed(duration)
        .map(|_| duration)
        .ok_or_else(out_of_range)
}

/// Most recent uploader status carrying a battery level, if any
pub fn parse_latest_device_status(doc: Value) -> RigwatchResult<Option<DeviceStatus>> {
    let statuses: Vec<DeviceStatusDoc> = parse_array(doc, "devicestatus")?;

    let mut latest: Option<DeviceStatus> = None;
    for s in &statuses {
        let battery = match s.uploader_battery.as_ref() {
            Some(b) => b.to_f64("uploaderBattery")?,
            None => continue,
        };

        let observed_at = parse_timestamp(&s.created_at)?;
        if latest.as_ref().map_or(true, |l| observed_at > l.observed_at) {
            let percent = battery.round().clamp(0.0, 100.0) as u8;
            latest = Some(DeviceStatus::new(percent, observed_at));
        }
    }

    Ok(latest)
}

/// Sensor glucose samples, oldest first
///
/// Non-`sgv` entries (meter readings, calibrations stored alongside) are
/// skipped.
pub fn parse_sensor_samples(doc: Value) -> RigwatchResult<Vec<SensorSample>> {
    let docs: Vec<SgvDoc> = parse_array(doc, "sgv")?;

    let mut samples = docs
        .iter()
        .filter(|d| d.kind.as_deref().map_or(true, |k| k == "sgv"))
        .map(|d| {
            Ok(SensorSample {
                observed_at: from_epoch_millis(d.date)?,
                sgv: d
                    .sgv
                    .as_ref()
                    .ok_or_else(|| RigwatchError::malformed("sgv entry without sgv value"))?
                    .to_f64("sgv")?,
                filtered: d
                    .filtered
                    .as_ref()
                    .map(|n| n.to_f64("filtered"))
                    .transpose()?
                    .unwrap_or(0.0),
                unfiltered: d
                    .unfiltered
                    .as_ref()
                    .map(|n| n.to_f64("unfiltered"))
                    .transpose()?
                    .unwrap_or(0.0),
                noise: d.noise,
            })
        })
        .collect::<RigwatchResult<Vec<_>>>()?;

    samples.sort_by_key(|s| s.observed_at);
    Ok(samples)
}

/// Most recent calibration record
pub fn parse_latest_calibration(doc: Value) -> RigwatchResult<Calibration> {
    let docs: Vec<CalDoc> = parse_array(doc, "cal")?;

    let mut latest: Option<Calibration> = None;
    for d in &docs {
        let cal = Calibration {
            observed_at: from_epoch_millis(d.date)?,
            slope: d.slope.to_f64("slope")?,
            intercept: d.intercept.to_f64("intercept")?,
            scale: d.scale.to_f64("scale")?,
        };
        if latest.as_ref().map_or(true, |l| cal.observed_at > l.observed_at) {
            latest = Some(cal);
        }
    }

    latest.ok_or(RigwatchError::MissingRecord("calibration"))
}
