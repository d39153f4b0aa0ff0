//! Pulls candidate arrivals for one stop out of a decoded feed.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::arrivals::display::format_clock;
use crate::arrivals::types::{ArrivalRecord, DEFAULT_DESTINATION, Line};
use crate::gtfs_rt::FeedMessage;
use crate::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};

/// Collects upcoming arrivals at `stop_id` for recognized lines.
///
/// Only arrivals strictly after `now` survive. The same `now` drives the
/// filter and `minutes_away`, so callers capture it once per run. The result
/// is unsorted.
pub fn extract_arrivals(feed: &FeedMessage, stop_id: &str, now: DateTime<Utc>) -> Vec<ArrivalRecord> {
    let mut arrivals = Vec::new();

    for entity in &feed.entity {
        let Some(trip_update) = &entity.trip_update else {
            continue;
        };

        let trip_id = trip_update.trip.trip_id.as_deref().unwrap_or("");
        let Some(line) = Line::from_trip_id(trip_id) else {
            continue;
        };

        for update in &trip_update.stop_time_update {
            if update.stop_id.as_deref() != Some(stop_id) {
                continue;
            }

            let Some(epoch) = predicted_epoch(update) else {
                debug!(entity_id = %entity.id, trip_id, "Stop-time update has no arrival or departure");
                continue;
            };

            let Some(arrival_time) = DateTime::from_timestamp(epoch, 0) else {
                debug!(entity_id = %entity.id, epoch, "Timestamp out of range");
                continue;
            };

            if arrival_time <= now {
                continue;
            }

            arrivals.push(ArrivalRecord {
                line,
                destination: DEFAULT_DESTINATION.to_string(),
                arrival_time,
                arrival_time_str: format_clock(arrival_time),
                minutes_away: minutes_away(arrival_time, now),
            });
        }
    }

    arrivals
}

/// Whole minutes until `arrival`, rounded to nearest.
pub fn minutes_away(arrival: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (arrival - now).num_milliseconds();
    (millis as f64 / 60_000.0).round() as i64
}

/// Arrival time if present, else departure time. Zero counts as absent.
fn predicted_epoch(update: &StopTimeUpdate) -> Option<i64> {
    event_time(update.arrival.as_ref()).or_else(|| event_time(update.departure.as_ref()))
}

fn event_time(event: Option<&StopTimeEvent>) -> Option<i64> {
    event.and_then(|e| e.time).filter(|t| *t != 0)
}
