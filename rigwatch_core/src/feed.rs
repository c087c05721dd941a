//! Data feed abstraction
//!
//! The engine never talks HTTP. It asks a [`FeedClient`] for one resource at a
//! time and receives the parsed JSON document, so a Nightscout site, a
//! directory of fixtures or an in-memory map can all stand behind it.

use crate::error::RigwatchResult;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Documents the engine reads from the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedResource {
    /// Treatment profiles, newest first (basal schedule and timezone)
    Profile,
    /// Recent treatments, searched for the latest temp basal
    Treatments { count: usize },
    /// Uploader status reports, newest first
    DeviceStatus,
    /// Sensor glucose samples, newest first
    SensorGlucose { count: usize },
    /// Sensor calibration records, newest first
    Calibration,
}

impl FeedResource {
    /// Resource name as used by the feed's REST API
    pub fn name(&self) -> &'static str {
        match self {
            FeedResource::Profile => "profile.json",
            FeedResource::Treatments { .. } => "treatments.json",
            FeedResource::DeviceStatus => "devicestatus.json",
            FeedResource::SensorGlucose { .. } => "sgv.json",
            FeedResource::Calibration => "cal.json",
        }
    }

    /// Number of records requested, if the resource is paged
    pub fn count(&self) -> Option<usize> {
        match self {
            FeedResource::Treatments { count } | FeedResource::SensorGlucose { count } => {
                Some(*count)
            }
            FeedResource::DeviceStatus | FeedResource::Calibration => Some(1),
            FeedResource::Profile => None,
        }
    }
}

impl fmt::Display for FeedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Asynchronous source of feed documents
///
/// Implementations own transport concerns such as retries and timeouts. Any
/// error they return fails the status computation that asked for it.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, resource: FeedResource) -> RigwatchResult<Value>;
}
