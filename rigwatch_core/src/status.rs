//! Public status operations
//!
//! Each operation fetches what it needs from the feed (concurrently when it
//! needs more than one document), resolves the values and renders a single
//! display string. Calls share no mutable state, and the first feed error
//! fails the whole call.

use crate::clock::{Clock, SystemClock};
use crate::config::DisplayConfig;
use crate::error::{RigwatchError, RigwatchResult};
use crate::feed::{FeedClient, FeedResource};
use crate::format;
use crate::params::StatusConstants;
use crate::recency;
use crate::records;
use crate::temp_basal::current_basal_status;
use std::sync::Arc;
use tracing::{debug, warn};

/// Every status line at once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub basal: String,
    pub battery: String,
    pub raw: String,
    pub staleness: String,
}

/// Resolves display strings from a feed and a clock
#[derive(Clone)]
pub struct StatusEngine {
    feed: Arc<dyn FeedClient>,
    clock: Arc<dyn Clock>,
    constants: StatusConstants,
}

impl StatusEngine {
    /// Engine on the system clock with default constants
    pub fn new(feed: Arc<dyn FeedClient>) -> Self {
        Self::with_clock(feed, Arc::new(SystemClock))
    }

    pub fn with_clock(feed: Arc<dyn FeedClient>, clock: Arc<dyn Clock>) -> Self {
        Self {
            feed,
            clock,
            constants: StatusConstants::default(),
        }
    }

    pub fn with_constants(mut self, constants: StatusConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn constants(&self) -> &StatusConstants {
        &self.constants
    }

    /// Current basal: running temp basal with diff and age, or scheduled rate
    pub async fn current_basal(&self, _config: &DisplayConfig) -> RigwatchResult<String> {
        let (profile, treatments) = tokio::try_join!(
            self.feed.fetch(FeedResource::Profile),
            self.feed.fetch(FeedResource::Treatments {
                count: self.constants.treatment_count,
            }),
        )?;

        let schedule = records::parse_schedule(profile)?;
        let latest = records::parse_latest_temp_basal(treatments)?;
        let now = self.clock.now();

        let status = current_basal_status(&schedule, latest.as_ref(), now);
        debug!("Basal at {}: {:?}", now, status);
        Ok(format::format_basal(&status))
    }

    /// Uploader battery level, or a placeholder when the report is stale
    pub async fn rig_battery_level(&self, _config: &DisplayConfig) -> RigwatchResult<String> {
        let doc = self.feed.fetch(FeedResource::DeviceStatus).await?;
        let status = records::parse_latest_device_status(doc)?;

        if status.is_none() {
            debug!("No device status with a battery level in feed");
        }

        Ok(format::format_battery(
            status.as_ref(),
            self.clock.now(),
            self.constants.device_status_recency_threshold_seconds,
        ))
    }

    /// Raw sensor values, oldest first, after the newest sample's noise label
    pub async fn raw_data(&self, config: &DisplayConfig) -> RigwatchResult<String> {
        let (sgv, cal) = tokio::try_join!(
            self.feed.fetch(FeedResource::SensorGlucose {
                count: self.constants.raw_sample_count,
            }),
            self.feed.fetch(FeedResource::Calibration),
        )?;

        let samples = records::parse_sensor_samples(sgv)?;
        if samples.is_empty() {
            return Err(RigwatchError::MissingRecord("sensor glucose"));
        }
        let calibration = records::parse_latest_calibration(cal)?;

        if let Some(code) = samples.last().and_then(|s| s.noise) {
            if !(1..=4).contains(&code) {
                warn!("Unknown sensor noise code {}", code);
            }
        }

        Ok(format::format_raw(&samples, &calibration, config.unit()))
    }

    /// Age label of the newest sensor sample, empty while data is fresh
    pub async fn sensor_staleness(&self, _config: &DisplayConfig) -> RigwatchResult<String> {
        let doc = self
            .feed
            .fetch(FeedResource::SensorGlucose { count: 1 })
            .await?;
        let samples = records::parse_sensor_samples(doc)?;
        let newest = samples
            .last()
            .ok_or(RigwatchError::MissingRecord("sensor glucose"))?;

        let now = self.clock.now();
        if recency::is_recent(
            newest.observed_at,
            now,
            self.constants.sensor_staleness_threshold_seconds,
        ) {
            return Ok(String::new());
        }

        Ok(format::staleness_label(recency::age_seconds(
            newest.observed_at,
            now,
        )))
    }

    /// All status lines, fetched concurrently
    pub async fn report(&self, config: &DisplayConfig) -> RigwatchResult<StatusReport> {
        let (basal, battery, raw, staleness) = tokio::try_join!(
            self.current_basal(config),
            self.rig_battery_level(config),
            self.raw_data(config),
            self.sensor_staleness(config),
        )?;

        Ok(StatusReport {
            basal,
            battery,
            raw,
            staleness,
        })
    }
}
