//! Raw sensor value reconstruction
//!
//! The feed stores a processed glucose value (`sgv`) for every sensor sample
//! together with the filtered and unfiltered signal. Using the most recent
//! calibration, the unfiltered signal is scaled by the same ratio that maps
//! the filtered signal onto the processed value, which yields the "raw"
//! glucose estimate shown next to the regular reading.

use crate::params::MMOL_PER_MGDL_DIVISOR;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Below this processed value the sensor reports error codes rather than glucose
const MIN_VALID_SGV: f64 = 40.0;

/// One sensor sample as read from the feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub observed_at: DateTime<Utc>,
    /// Processed glucose value in mg/dL
    pub sgv: f64,
    pub filtered: f64,
    pub unfiltered: f64,
    /// Sensor-reported noise code, when present
    pub noise: Option<i64>,
}

/// Sensor calibration parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub observed_at: DateTime<Utc>,
    pub slope: f64,
    pub intercept: f64,
    pub scale: f64,
}

impl Calibration {
    /// Signal converted to mg/dL with this calibration alone
    fn signal_to_mgdl(&self, signal: f64) -> f64 {
        self.scale * (signal - self.intercept) / self.slope
    }

    /// Raw glucose estimate for `sample`, in mg/dL
    ///
    /// Returns 0 when the calibration or the signal cannot produce a finite
    /// value.
    pub fn raw_value(&self, sample: &SensorSample) -> f64 {
        if self.slope == 0.0 || self.scale == 0.0 || sample.unfiltered == 0.0 {
            return 0.0;
        }

        let unfiltered = self.signal_to_mgdl(sample.unfiltered);
        let raw = if sample.filtered == 0.0 || sample.sgv < MIN_VALID_SGV {
            unfiltered
        } else {
            let ratio = self.signal_to_mgdl(sample.filtered) / sample.sgv;
            if ratio == 0.0 {
                return 0.0;
            }
            unfiltered / ratio
        };

        if raw.is_finite() {
            raw
        } else {
            0.0
        }
    }
}

/// Raw glucose estimate for `sample` under `calibration`, in mg/dL
pub fn raw_value(sample: &SensorSample, calibration: &Calibration) -> f64 {
    calibration.raw_value(sample)
}

/// Signal quality reported with a sensor sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorNoise {
    Clean,
    Light,
    Medium,
    Heavy,
    Unknown,
}

impl SensorNoise {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => SensorNoise::Clean,
            Some(2) => SensorNoise::Light,
            Some(3) => SensorNoise::Medium,
            Some(4) => SensorNoise::Heavy,
            _ => SensorNoise::Unknown,
        }
    }

    /// Three-character display label
    pub fn label(&self) -> &'static str {
        match self {
            SensorNoise::Clean => "Cln",
            SensorNoise::Light => "Lgt",
            SensorNoise::Medium => "Med",
            SensorNoise::Heavy => "Hvy",
            SensorNoise::Unknown => "---",
        }
    }
}

/// Unit glucose values are displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlucoseUnit {
    #[default]
    MgDl,
    Mmol,
}

impl GlucoseUnit {
    pub fn from_mmol_flag(mmol: bool) -> Self {
        if mmol {
            GlucoseUnit::Mmol
        } else {
            GlucoseUnit::MgDl
        }
    }

    /// Render an mg/dL value in this unit
    ///
    /// mg/dL values are rounded to whole numbers, mmol/L values to one decimal.
    pub fn render(&self, mgdl: f64) -> String {
        match self {
            GlucoseUnit::MgDl => format!("{}", mgdl.round() as i64),
            GlucoseUnit::Mmol => format!("{:.1}", mgdl / MMOL_PER_MGDL_DIVISOR),
        }
    }
}
