//! End-to-end status lines over recorded feed documents

use async_trait::async_trait;
use rigwatch_core::{
    DisplayConfig, FeedClient, FeedResource, FixedClock, RigwatchError, RigwatchResult,
    StatusConstants, StatusEngine,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Serves canned documents by resource name
struct FixtureFeed {
    docs: HashMap<&'static str, Value>,
}

impl FixtureFeed {
    fn new(docs: Vec<(&'static str, Value)>) -> Arc<Self> {
        Arc::new(Self {
            docs: docs.into_iter().collect(),
        })
    }
}

#[async_trait]
impl FeedClient for FixtureFeed {
    async fn fetch(&self, resource: FeedResource) -> RigwatchResult<Value> {
        self.docs
            .get(resource.name())
            .cloned()
            .ok_or_else(|| RigwatchError::feed(resource.name(), "404 Not Found"))
    }
}

fn profile() -> Value {
    json!([{
        "created_at": "2015-10-22T17:58-0700",
        "startDate": "2015-10-22T17:57-0700",
        "timezone": "America/Los_Angeles",
        "basal": [
            {"time": "00:00", "value": "0.45"},
            {"time": "08:00", "value": "0.65"},
            {"time": "18:00", "value": "0.55"}
        ]
    }])
}

fn treatments(timestamp: &str) -> Value {
    json!([{
        "raw_rate": {
            "_type": "TempBasal",
            "temp": "absolute",
            "timestamp": timestamp,
            "rate": 0
        },
        "raw_duration": {
            "_type": "TempBasalDuration",
            "timestamp": timestamp,
            "duration (min)": 30
        },
        "created_at": "2015-12-03T14:12:25-08:00",
        "enteredBy": "openaps://medtronic/522",
        "rate": 0,
        "eventType": "Temp Basal",
        "timestamp": timestamp,
        "duration": "30",
        "absolute": "0"
    }])
}

fn sgvs(last_noise: i64) -> Value {
    json!([
        {
            "date": 1449535203000_i64,
            "dateString": "2015-12-08T00:40:03+00:00",
            "direction": "FortyFiveDown",
            "filtered": 180352,
            "noise": last_noise,
            "sgv": 146,
            "type": "sgv",
            "unfiltered": 172672
        },
        {
            "date": 1449534904000_i64,
            "dateString": "2015-12-08T00:35:04+00:00",
            "direction": "FortyFiveDown",
            "filtered": 186240,
            "noise": 1,
            "sgv": 153,
            "type": "sgv",
            "unfiltered": 178528
        }
    ])
}

fn cal() -> Value {
    json!([{
        "date": 1449309612000_i64,
        "dateString": "2015-12-05T10:00:12+00:00",
        "intercept": 27370.3970783194,
        "scale": 1,
        "slope": 786.670463685642,
        "type": "cal"
    }])
}

fn basal_engine(now: &str) -> StatusEngine {
    StatusEngine::with_clock(
        FixtureFeed::new(vec![
            ("profile.json", profile()),
            ("treatments.json", treatments("2015-12-03T14:12:25-08:00")),
        ]),
        Arc::new(FixedClock::parse(now).unwrap()),
    )
}

async fn basal_at(now: &str) -> String {
    basal_engine(now)
        .current_basal(&DisplayConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_temp_basal_reports_diff_and_recency() {
    assert_eq!(basal_at("2015-12-03T14:20:25-08:00").await, "0u/h -0.65 (8)");
}

#[tokio::test]
async fn test_temp_basal_recency_advances() {
    assert_eq!(basal_at("2015-12-03T14:28:25-08:00").await, "0u/h -0.65 (16)");
}

#[tokio::test]
async fn test_profile_rate_after_temp_basal_expires() {
    assert_eq!(basal_at("2015-12-03T14:50:25-08:00").await, "0.65u/h");
}

#[tokio::test]
async fn test_profile_rate_at_any_time() {
    assert_eq!(basal_at("2015-12-03T20:50:25-08:00").await, "0.55u/h");
}

#[tokio::test]
async fn test_temp_basal_boundary() {
    assert_eq!(basal_at("2015-12-03T14:42:24-08:00").await, "0u/h -0.65 (29)");
    assert_eq!(basal_at("2015-12-03T14:42:25-08:00").await, "0.65u/h");
}

fn battery_engine(threshold_seconds: i64) -> StatusEngine {
    let device_status = json!([{
        "uploaderBattery": 37,
        "created_at": "2015-12-04T01:05:18.994Z"
    }]);

    StatusEngine::with_clock(
        FixtureFeed::new(vec![("devicestatus.json", device_status)]),
        Arc::new(FixedClock::parse("2015-12-04T01:25:18.994Z").unwrap()),
    )
    .with_constants(StatusConstants::default().with_device_status_threshold(threshold_seconds))
}

#[tokio::test]
async fn test_rig_battery_when_recent() {
    let battery = battery_engine(1800)
        .rig_battery_level(&DisplayConfig::default())
        .await
        .unwrap();
    assert_eq!(battery, "Rig 37%");
}

#[tokio::test]
async fn test_rig_battery_hidden_when_stale() {
    let battery = battery_engine(60)
        .rig_battery_level(&DisplayConfig::default())
        .await
        .unwrap();
    assert_eq!(battery, "-");
}

fn raw_engine(last_noise: i64) -> StatusEngine {
    StatusEngine::with_clock(
        FixtureFeed::new(vec![("sgv.json", sgvs(last_noise)), ("cal.json", cal())]),
        Arc::new(FixedClock::parse("2015-12-08T00:41:00Z").unwrap()),
    )
}

#[tokio::test]
async fn test_raw_values_ascending_with_newest_noise() {
    let raw = raw_engine(1)
        .raw_data(&DisplayConfig::default())
        .await
        .unwrap();
    assert_eq!(raw, "Cln 146 139");
}

#[tokio::test]
async fn test_raw_values_in_mmol() {
    let raw = raw_engine(2).raw_data(&DisplayConfig::mmol()).await.unwrap();
    assert_eq!(raw, "Lgt 8.1 7.7");
}

#[tokio::test]
async fn test_raw_values_with_unknown_noise() {
    let raw = raw_engine(7)
        .raw_data(&DisplayConfig::default())
        .await
        .unwrap();
    assert_eq!(raw, "--- 146 139");
}

#[tokio::test]
async fn test_raw_values_fail_without_calibration() {
    let engine = StatusEngine::with_clock(
        FixtureFeed::new(vec![("sgv.json", sgvs(1))]),
        Arc::new(FixedClock::parse("2015-12-08T00:41:00Z").unwrap()),
    );

    let err = engine
        .raw_data(&DisplayConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RigwatchError::Feed { .. }));
}

#[tokio::test]
async fn test_full_report() {
    let engine = StatusEngine::with_clock(
        FixtureFeed::new(vec![
            ("profile.json", profile()),
            ("treatments.json", treatments("2015-12-03T14:12:25-08:00")),
            (
                "devicestatus.json",
                json!([{"uploaderBattery": 80, "created_at": "2015-12-08T00:30:00Z"}]),
            ),
            ("sgv.json", sgvs(1)),
            ("cal.json", cal()),
        ]),
        Arc::new(FixedClock::parse("2015-12-08T00:41:00Z").unwrap()),
    );

    let report = engine.report(&DisplayConfig::default()).await.unwrap();
    // 16:41 in Los Angeles
    assert_eq!(report.basal, "0.65u/h");
    assert_eq!(report.battery, "Rig 80%");
    assert_eq!(report.raw, "Cln 146 139");
    assert_eq!(report.staleness, "");
}
