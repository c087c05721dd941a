//! Feed clients for the `rigwatch` binary

pub mod directory;
pub mod nightscout;
pub mod retry;

pub use directory::DirectoryFeed;
pub use nightscout::NightscoutFeed;
pub use retry::RetryPolicy;

use anyhow::{bail, Result};
use rigwatch_core::{FeedClient, FeedConfig};
use std::path::Path;
use std::sync::Arc;

/// Pick the feed: a fixtures directory if given, otherwise the configured site
pub fn build_feed(config: &FeedConfig, fixtures: Option<&Path>) -> Result<Arc<dyn FeedClient>> {
    if let Some(dir) = fixtures {
        if !dir.is_dir() {
            bail!("Fixtures directory {:?} does not exist", dir);
        }
        return Ok(Arc::new(DirectoryFeed::new(dir)));
    }

    match config.url.as_deref() {
        Some(url) => Ok(Arc::new(NightscoutFeed::new(url, config)?)),
        None => bail!(
            "No feed configured.\n\n\
            Set [feed] url in rigwatch.toml, pass --url <SITE>, or --fixtures <DIR>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_a_source() {
        let err = build_feed(&FeedConfig::default(), None).err().unwrap();
        assert!(err.to_string().contains("No feed configured"));
    }

    #[test]
    fn test_fixtures_must_exist() {
        assert!(build_feed(&FeedConfig::default(), Some(Path::new("/nonexistent/fixtures"))).is_err());
    }

    #[test]
    fn test_fixtures_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let config = FeedConfig {
            url: Some("https://cgm.example.com".to_string()),
            ..FeedConfig::default()
        };
        assert!(build_feed(&config, Some(dir.path())).is_ok());
        assert!(build_feed(&config, None).is_ok());
    }
}
