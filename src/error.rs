//! Error types for the arrival pipeline.

use thiserror::Error;

/// Failure to obtain a usable feed message for this cycle.
///
/// Network and decode failures are deliberately one type: consumers treat
/// both as "no data this cycle".
#[derive(Debug, Error)]
pub enum FeedError {
    /// The configured feed URL could not be parsed.
    #[error("invalid feed url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Transport-level failure (connect, TLS, body read).
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("feed endpoint responded with status {status}")]
    Status { status: u16 },

    /// The payload is not a valid GTFS-RT `FeedMessage`.
    #[error("feed payload could not be decoded: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl FeedError {
    /// Returns `true` for failures that happened before a payload arrived.
    pub fn is_network(&self) -> bool {
        !matches!(self, FeedError::Decode(_))
    }
}

/// Reasons a pipeline run produced no snapshot worth serving or caching.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The feed was read but nothing upcoming matched the stop.
    #[error("no upcoming arrivals for stop {stop_id}")]
    NoArrivals { stop_id: String },
}
