//! Configuration file support for RIGWATCH
//!
//! Feed location, display preferences and thresholds can be read from a TOML
//! or YAML file. Format is picked by extension, with a fallback that tries
//! both.

use crate::calibration::GlucoseUnit;
use crate::error::{RigwatchError, RigwatchResult};
use crate::params::StatusConstants;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_RETRIES: usize = 2;

/// Per-call display options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show glucose values in mmol/L instead of mg/dL
    pub mmol: bool,
}

impl DisplayConfig {
    pub fn mmol() -> Self {
        Self { mmol: true }
    }

    pub fn unit(&self) -> GlucoseUnit {
        GlucoseUnit::from_mmol_flag(self.mmol)
    }
}

/// Where and how to reach the data feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base URL of the Nightscout site (e.g., "https://my-site.example.com")
    pub url: Option<String>,

    /// Access token sent as the `token` query parameter
    pub token: Option<String>,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    pub max_retries: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Full configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigwatchConfig {
    pub feed: FeedConfig,
    pub display: DisplayConfig,
    pub constants: StatusConstants,
}

impl RigwatchConfig {
    /// Load config from a file (auto-detect format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> RigwatchResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RigwatchError::config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_toml(&contents).or_else(|_| Self::from_yaml(&contents)),
        }
    }

    /// Parse config from TOML string
    pub fn from_toml(contents: &str) -> RigwatchResult<Self> {
        toml::from_str(contents)
            .map_err(|e| RigwatchError::config(format!("Failed to parse TOML: {}", e)))
    }

    /// Parse config from YAML string
    pub fn from_yaml(contents: &str) -> RigwatchResult<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| RigwatchError::config(format!("Failed to parse YAML: {}", e)))
    }

    /// Load the first config file found in the standard search paths
    ///
    /// Search order:
    /// 1. ./rigwatch.toml, ./rigwatch.yaml or ./rigwatch.yml
    /// 2. ~/.rigwatch/config.toml or ~/.rigwatch/config.yaml
    /// 3. /etc/rigwatch/config.toml or /etc/rigwatch/config.yaml
    ///
    /// Returns `None` when no file exists.
    pub fn find_and_load() -> RigwatchResult<Option<Self>> {
        Self::get_search_paths()
            .into_iter()
            .find(|path| path.exists())
            .map(Self::from_file)
            .transpose()
    }

    /// Explicit path if given, otherwise the search paths, otherwise defaults
    pub fn load(path: Option<&Path>) -> RigwatchResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::find_and_load()?.unwrap_or_default()),
        }
    }

    /// Get standard config file search paths
    pub fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("rigwatch.toml"),
            PathBuf::from("rigwatch.yaml"),
            PathBuf::from("rigwatch.yml"),
        ];

        if let Some(home) = dirs::home_dir() {
            let rigwatch_dir = home.join(".rigwatch");
            paths.push(rigwatch_dir.join("config.toml"));
            paths.push(rigwatch_dir.join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/rigwatch/config.toml"));
        paths.push(PathBuf::from("/etc/rigwatch/config.yaml"));

        paths
    }
}
