use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::arrivals::Line;
use crate::gtfs_rt::FeedMessage;

/// Shape of a decoded feed as seen from one stop.
#[derive(Debug, Default, Serialize)]
pub struct FeedSummary {
    pub timestamp: DateTime<Utc>,
    pub stop_id: String,
    pub feed_timestamp: Option<u64>,
    pub total_entities: usize,

    // entity types
    pub trip_updates: usize,
    pub vehicles: usize,
    pub alerts: usize,

    // trip classification
    pub a_trips: usize,
    pub c_trips: usize,
    pub unrecognized_trips: usize,

    // stop-time updates on recognized trips at `stop_id`
    pub stop_matches: usize,
    pub with_arrival: usize,
    pub with_departure_only: usize,
    pub without_times: usize,
}

impl FeedSummary {
    pub fn from_feed(feed: &FeedMessage, stop_id: &str) -> Self {
        let mut s = FeedSummary {
            timestamp: Utc::now(),
            stop_id: stop_id.to_string(),
            feed_timestamp: feed.header.timestamp,
            total_entities: feed.entity.len(),
            ..Default::default()
        };

        for e in &feed.entity {
            if e.vehicle.is_some() {
                s.vehicles += 1;
            }

            if e.alert.is_some() {
                s.alerts += 1;
            }

            let Some(tu) = &e.trip_update else {
                continue;
            };
            s.trip_updates += 1;

            let trip_id = tu.trip.trip_id.as_deref().unwrap_or("");
            match Line::from_trip_id(trip_id) {
                Some(Line::A) => s.a_trips += 1,
                Some(Line::C) => s.c_trips += 1,
                None => {
                    s.unrecognized_trips += 1;
                    continue;
                }
            }

            for stu in tu
                .stop_time_update
                .iter()
                .filter(|u| u.stop_id.as_deref() == Some(stop_id))
            {
                s.stop_matches += 1;

                let has = |ev: &Option<crate::gtfs_rt::trip_update::StopTimeEvent>| {
                    ev.as_ref().and_then(|e| e.time).is_some_and(|t| t != 0)
                };

                if has(&stu.arrival) {
                    s.with_arrival += 1;
                } else if has(&stu.departure) {
                    s.with_departure_only += 1;
                } else {
                    s.without_times += 1;
                }
            }
        }

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Share of recognized trips, as a percentage of all trip updates.
    pub fn recognized_pct(&self) -> f64 {
        Self::pct(self.a_trips + self.c_trips, self.trip_updates)
    }
}
