//! Public entry point for arrival data.
//!
//! [`SubwayService::get_data`] prefers the cache, falls back to an uncached
//! run when the cache path fails, and as a last resort hands back an empty
//! but renderable snapshot. It never returns an error.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::arrivals::{ArrivalSnapshot, aggregate_arrivals, extract_arrivals};
use crate::cache::{CacheConfig, Population, SnapshotCache};
use crate::config::SubwayConfig;
use crate::error::SnapshotError;
use crate::fetch::{FeedFetcher, FeedSource};
use crate::parser::parse_feed;

pub const DEFAULT_STOP_ID: &str = "A42N";
pub const DEFAULT_STATION_NAME: &str = "Utica Ave";
pub const DEFAULT_DIRECTION: &str = "Manhattan";
/// Arrivals kept per line; the combined list holds twice this.
pub const DEFAULT_MAX_TRAINS: usize = 4;

/// Caller-supplied parameters. Missing, blank, or zero values use defaults.
#[derive(Debug, Clone, Default)]
pub struct SubwayParams {
    pub stop_id: Option<String>,
    pub station_name: Option<String>,
    pub direction: Option<String>,
    pub max_trains: Option<usize>,
}

/// Parameters after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub stop_id: String,
    pub station_name: String,
    pub direction: String,
    pub per_line_limit: usize,
}

impl SubwayParams {
    pub fn resolve(&self) -> SnapshotRequest {
        fn or_default(value: &Option<String>, default: &str) -> String {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        }

        SnapshotRequest {
            stop_id: or_default(&self.stop_id, DEFAULT_STOP_ID),
            station_name: or_default(&self.station_name, DEFAULT_STATION_NAME),
            direction: or_default(&self.direction, DEFAULT_DIRECTION),
            per_line_limit: self
                .max_trains
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_TRAINS),
        }
    }
}

/// Cached arrival pipeline over a feed source.
pub struct SubwayService<S> {
    source: S,
    cache: SnapshotCache,
}

impl SubwayService<FeedFetcher> {
    /// Service reading the configured HTTP feed.
    pub fn from_config(config: &SubwayConfig) -> Self {
        Self::new(FeedFetcher::new(config.feed_url.clone()), &config.cache)
    }
}

impl<S: FeedSource> SubwayService<S> {
    pub fn new(source: S, cache_config: &CacheConfig) -> Self {
        Self {
            source,
            cache: SnapshotCache::new(cache_config),
        }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Arrival snapshot for the requested stop. Always returns something
    /// renderable.
    ///
    /// Entries are keyed by stop only, so within a TTL window every caller
    /// for that stop sees the station name, direction, and limit of whichever
    /// call populated the entry.
    pub async fn get_data(&self, params: SubwayParams) -> Arc<ArrivalSnapshot> {
        let request = params.resolve();

        let cached = self
            .cache
            .get_or_populate(&request.stop_id, async {
                Population::from(self.run_pipeline(&request).await)
            })
            .await;

        match cached {
            Ok(snapshot) => return snapshot,
            Err(reason) => {
                info!(stop_id = %request.stop_id, reason = %reason, "Cache skipped, fetching directly");
            }
        }

        match self.run_pipeline(&request).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                warn!(stop_id = %request.stop_id, error = %e, "No arrival data available, serving empty board");
                Arc::new(ArrivalSnapshot::unavailable(
                    request.station_name,
                    request.direction,
                    Utc::now(),
                ))
            }
        }
    }

    /// One uncached pipeline run, surfacing the failure instead of degrading.
    pub async fn snapshot(&self, params: &SubwayParams) -> Result<ArrivalSnapshot, SnapshotError> {
        self.run_pipeline(&params.resolve()).await
    }

    /// fetch → decode → extract → aggregate, with a single clock capture.
    #[tracing::instrument(skip(self, request), fields(stop_id = %request.stop_id))]
    async fn run_pipeline(&self, request: &SnapshotRequest) -> Result<ArrivalSnapshot, SnapshotError> {
        let bytes = self.source.fetch().await?;
        let feed = parse_feed(&bytes)?;

        let now = Utc::now();
        let records = extract_arrivals(&feed, &request.stop_id, now);
        if records.is_empty() {
            return Err(SnapshotError::NoArrivals {
                stop_id: request.stop_id.clone(),
            });
        }

        let aggregated = aggregate_arrivals(records, request.per_line_limit);
        info!(
            entities = feed.entity.len(),
            arrivals = aggregated.all.len(),
            "Arrival snapshot built"
        );

        Ok(ArrivalSnapshot::from_aggregated(
            request.station_name.clone(),
            request.direction.clone(),
            aggregated,
            now,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrivals::Line;
    use crate::error::FeedError;
    use crate::testing::{feed, single_arrival_payload, stop_time, trip_entity};
    use async_trait::async_trait;
    use bytes::Bytes;
    use prost::Message;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays queued responses; once drained every fetch fails.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<u8>, FeedError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<u8>, FeedError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeedSource for ScriptedSource {
        async fn fetch(&self) -> Result<Bytes, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            next.unwrap_or(Err(FeedError::Status { status: 503 }))
                .map(Bytes::from)
        }
    }

    fn outage() -> Result<Vec<u8>, FeedError> {
        Err(FeedError::Status { status: 503 })
    }

    fn in_secs(secs: i64) -> i64 {
        Utc::now().timestamp() + secs
    }

    fn service(responses: Vec<Result<Vec<u8>, FeedError>>) -> SubwayService<ScriptedSource> {
        SubwayService::new(ScriptedSource::new(responses), &CacheConfig::default())
    }

    #[test]
    fn params_fall_back_to_defaults() {
        let request = SubwayParams::default().resolve();
        assert_eq!(
            request,
            SnapshotRequest {
                stop_id: "A42N".into(),
                station_name: "Utica Ave".into(),
                direction: "Manhattan".into(),
                per_line_limit: 4,
            }
        );

        let blank = SubwayParams {
            stop_id: Some(String::new()),
            station_name: Some("Nostrand Av".into()),
            direction: None,
            max_trains: Some(0),
        }
        .resolve();
        assert_eq!(blank.stop_id, "A42N");
        assert_eq!(blank.station_name, "Nostrand Av");
        assert_eq!(blank.per_line_limit, 4);
    }

    #[tokio::test]
    async fn single_upcoming_a_train() {
        let svc = service(vec![Ok(single_arrival_payload("A42N", in_secs(300)))]);

        let snap = svc.get_data(SubwayParams::default()).await;

        assert_eq!(snap.for_line(Line::A).len(), 1);
        assert_eq!(snap.for_line(Line::A)[0].minutes_away, 5);
        assert!(snap.for_line(Line::C).is_empty());
        assert_eq!(snap.arrivals.len(), 1);
        assert_eq!(snap.station_name, "Utica Ave");
        assert_ne!(snap.last_updated, "N/A");
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_empty_snapshot() {
        let svc = service(vec![]);

        let snap = svc.get_data(SubwayParams::default()).await;

        assert!(snap.arrivals.is_empty());
        assert_eq!(snap.lines.len(), 2);
        assert!(snap.lines.iter().all(|l| l.arrivals.is_empty()));
        assert_eq!(snap.last_updated, "N/A");
        assert!(!snap.current_time.is_empty());
        assert!(!snap.current_date.is_empty());
        // cache path, then the direct fallback
        assert_eq!(svc.source.calls(), 2);
        assert!(!svc.cache().contains("A42N"));
    }

    #[tokio::test]
    async fn decode_failure_degrades_like_fetch_failure() {
        let svc = service(vec![Ok(vec![0xFF, 0xFE, 0x00, 0x01]), Ok(vec![0xFF])]);

        let snap = svc.get_data(SubwayParams::default()).await;

        assert!(snap.is_empty());
        assert_eq!(snap.last_updated, "N/A");
    }

    #[tokio::test]
    async fn zero_arrivals_are_not_cached() {
        let elsewhere = feed(vec![trip_entity(
            "1",
            "021150_A..N",
            vec![stop_time("A41N", Some(in_secs(300)), None)],
        )])
        .encode_to_vec();
        let svc = service(vec![Ok(elsewhere.clone()), Ok(elsewhere)]);

        let snap = svc.get_data(SubwayParams::default()).await;

        assert!(snap.for_line(Line::A).is_empty());
        assert!(snap.for_line(Line::C).is_empty());
        assert!(!svc.cache().contains("A42N"));
        assert!(svc.cache().peek("A42N").await.is_none());
    }

    #[tokio::test]
    async fn cached_snapshot_survives_upstream_failure() {
        let svc = service(vec![Ok(single_arrival_payload("A42N", in_secs(300))), outage()]);

        let first = svc.get_data(SubwayParams::default()).await;
        let second = svc.get_data(SubwayParams::default()).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(svc.source.calls(), 1);
    }

    #[tokio::test]
    async fn direct_fallback_result_is_served_but_not_cached() {
        let svc = service(vec![
            outage(),
            Ok(single_arrival_payload("A42N", in_secs(120))),
        ]);

        let snap = svc.get_data(SubwayParams::default()).await;

        assert_eq!(snap.for_line(Line::A).len(), 1);
        assert!(!svc.cache().contains("A42N"));
    }

    #[tokio::test]
    async fn per_line_limit_follows_params() {
        let updates: Vec<_> = (1..=6)
            .map(|i| stop_time("A42N", Some(in_secs(i * 60)), None))
            .collect();
        let payload = feed(vec![
            trip_entity("1", "021150_A..N", updates.clone()),
            trip_entity("2", "021300_C..N", updates),
        ])
        .encode_to_vec();
        let svc = service(vec![Ok(payload)]);

        let snap = svc
            .get_data(SubwayParams {
                max_trains: Some(2),
                ..Default::default()
            })
            .await;

        assert_eq!(snap.for_line(Line::A).len(), 2);
        assert_eq!(snap.for_line(Line::C).len(), 2);
        assert_eq!(snap.arrivals.len(), 4);
    }

    #[tokio::test]
    async fn snapshot_surfaces_pipeline_errors() {
        let svc = service(vec![]);

        let err = svc.snapshot(&SubwayParams::default()).await.unwrap_err();

        assert!(matches!(err, SnapshotError::Feed(FeedError::Status { status: 503 })));
    }
}
