//! # RIGWATCH Core
//!
//! Status-resolution engine behind the RIGWATCH watch-face feed.
//!
//! Three independent computations turn data from a Nightscout-style feed into
//! short display strings:
//!
//! - **Basal**: the daily schedule, shadowed by a running temp basal
//! - **Rig battery**: the uploader battery level, hidden once it goes stale
//! - **Raw data**: sensor signal reconstructed with the latest calibration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rigwatch_core::{DisplayConfig, FeedClient, StatusEngine};
//! use std::sync::Arc;
//!
//! async fn show(feed: Arc<dyn FeedClient>) -> rigwatch_core::RigwatchResult<()> {
//!     let engine = StatusEngine::new(feed);
//!     println!("{}", engine.current_basal(&DisplayConfig::default()).await?);
//!     Ok(())
//! }
//! ```

pub mod calibration;
pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod format;
pub mod params;
pub mod recency;
pub mod records;
pub mod schedule;
pub mod status;
pub mod temp_basal;

// Re-export commonly used types for easy access
pub use calibration::{Calibration, GlucoseUnit, SensorNoise, SensorSample};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DisplayConfig, FeedConfig, RigwatchConfig};
pub use error::{RigwatchError, RigwatchResult};
pub use feed::{FeedClient, FeedResource};
pub use params::StatusConstants;
pub use recency::{is_recent, DeviceStatus};
pub use schedule::{BasalEntry, BasalSchedule};
pub use status::{StatusEngine, StatusReport};
pub use temp_basal::{current_basal_status, BasalStatus, TempBasal};
