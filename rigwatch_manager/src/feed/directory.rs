//! Feed served from JSON files on disk
//!
//! Each resource is read from `{dir}/{resource name}` (e.g. `sgv.json`).
//! Paged resources are truncated to the requested count, as the REST API would.

use async_trait::async_trait;
use rigwatch_core::{FeedClient, FeedResource, RigwatchError, RigwatchResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DirectoryFeed {
    root: PathBuf,
}

impl DirectoryFeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, resource: FeedResource) -> PathBuf {
        self.root.join(resource.name())
    }
}

#[async_trait]
impl FeedClient for DirectoryFeed {
    async fn fetch(&self, resource: FeedResource) -> RigwatchResult<Value> {
        let path = self.path_for(resource);
        debug!("Reading {}", path.display());

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| RigwatchError::feed(resource.name(), format!("{}: {}", path.display(), e)))?;
        let doc: Value = serde_json::from_str(&contents)
            .map_err(|e| RigwatchError::feed(resource.name(), format!("invalid JSON: {}", e)))?;

        Ok(match (doc, resource.count()) {
            (Value::Array(mut items), Some(count)) => {
                items.truncate(count);
                Value::Array(items)
            }
            (doc, _) => doc,
        })
    }
}
