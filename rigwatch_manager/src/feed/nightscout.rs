//! Nightscout REST feed
//!
//! Fetches `{site}/api/v1/{resource}` with `reqwest`, retrying transport
//! failures and server errors according to a [`RetryPolicy`].

use super::retry::RetryPolicy;
use async_trait::async_trait;
use rigwatch_core::{FeedClient, FeedConfig, FeedResource, RigwatchError, RigwatchResult};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

const API_PREFIX: &str = "api/v1";

/// Outcome of a single failed request
#[derive(Debug)]
enum AttemptError {
    /// Worth trying again (connection refused, timeout, 5xx)
    Transient(String),
    /// Retrying will not help (4xx, bad JSON)
    Fatal(String),
}

/// Feed backed by a Nightscout site
#[derive(Debug, Clone)]
pub struct NightscoutFeed {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl NightscoutFeed {
    /// Client for the site at `url` using the timeout, token and retry budget from `config`
    pub fn new(url: &str, config: &FeedConfig) -> RigwatchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RigwatchError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_url(url),
            token: config.token.clone(),
            retry: RetryPolicy::with_max_retries(config.max_retries),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a resource, without query parameters
    pub fn resource_url(&self, resource: FeedResource) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, resource.name())
    }

    /// Query parameters narrowing a resource to what the engine reads
    pub fn query(&self, resource: FeedResource) -> Vec<(String, String)> {
        let mut params = Vec::new();

        match resource {
            FeedResource::Treatments { .. } => {
                params.push(("find[eventType]".to_string(), "Temp Basal".to_string()));
            }
            FeedResource::DeviceStatus => {
                params.push((
                    "find[uploaderBattery][$exists]".to_string(),
                    "true".to_string(),
                ));
            }
            FeedResource::Profile
            | FeedResource::SensorGlucose { .. }
            | FeedResource::Calibration => {}
        }

        if let Some(count) = resource.count() {
            params.push(("count".to_string(), count.to_string()));
        }
        if let Some(token) = &self.token {
            params.push(("token".to_string(), token.clone()));
        }

        params
    }

    async fn fetch_once(&self, resource: FeedResource) -> Result<Value, AttemptError> {
        let response = self
            .client
            .get(self.resource_url(resource))
            .query(&self.query(resource))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AttemptError::Transient(format!("server returned {}", status)));
        }
        if !status.is_success() {
            return Err(AttemptError::Fatal(format!("server returned {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AttemptError::Fatal(format!("invalid JSON body: {}", e)))
    }
}

#[async_trait]
impl FeedClient for NightscoutFeed {
    async fn fetch(&self, resource: FeedResource) -> RigwatchResult<Value> {
        info!("GET {}", self.resource_url(resource));

        let mut retries = 0;
        loop {
            match self.fetch_once(resource).await {
                Ok(doc) => return Ok(doc),
                Err(AttemptError::Transient(msg)) if self.retry.should_retry(retries) => {
                    retries += 1;
                    warn!(
                        "Fetching {} failed ({}), retry {}/{}",
                        resource, msg, retries, self.retry.max_retries
                    );
                    self.retry.wait(retries).await;
                }
                Err(AttemptError::Transient(msg)) | Err(AttemptError::Fatal(msg)) => {
                    debug!("Giving up on {} after {} retries", resource, retries);
                    return Err(RigwatchError::feed(resource.name(), msg));
                }
            }
        }
    }
}

/// Accept bare hosts as well as full URLs; no trailing slash
fn normalize_url(addr: &str) -> String {
    let addr = addr.trim().trim_end_matches('/');
    let with_scheme = if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("https://{}", addr)
    };

    with_scheme
        .strip_suffix(&format!("/{}", API_PREFIX))
        .map(str::to_string)
        .unwrap_or(with_scheme)
}
