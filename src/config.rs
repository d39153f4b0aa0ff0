//! Runtime configuration.
//!
//! Values come from the process environment (after `.env` is loaded by the
//! binary). Anything unset falls back to the production defaults.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::cache::CacheConfig;

/// Live A/C/E trip-update feed.
pub const DEFAULT_FEED_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-ace";

pub const ENV_FEED_URL: &str = "SUBWAY_FEED_URL";
pub const ENV_CACHE_TTL_SECS: &str = "SUBWAY_CACHE_TTL_SECS";
pub const ENV_CACHE_CAPACITY: &str = "SUBWAY_CACHE_CAPACITY";

/// Configuration for the arrival service.
#[derive(Debug, Clone)]
pub struct SubwayConfig {
    /// GTFS-RT endpoint to read.
    pub feed_url: String,
    pub cache: CacheConfig,
}

impl Default for SubwayConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            cache: CacheConfig::default(),
        }
    }
}

impl SubwayConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric setting is present but not a number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_FEED_URL).filter(|u| !u.trim().is_empty()) {
            config.feed_url = url;
        }

        if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CACHE_TTL_SECS} must be whole seconds, got '{raw}'"))?;
            config.cache.ttl = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            config.cache.max_capacity = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CACHE_CAPACITY} must be a count, got '{raw}'"))?;
        }

        Ok(config)
    }

    /// Point at a different feed (for testing).
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl = ttl;
        self
    }
}
