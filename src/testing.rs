//! Feed and record builders shared by unit tests.

use chrono::{DateTime, Utc};
use prost::Message;

use crate::arrivals::display::format_clock;
use crate::arrivals::{ArrivalRecord, DEFAULT_DESTINATION, Line};
use crate::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
use crate::gtfs_rt::{FeedEntity, FeedHeader, FeedMessage, TripDescriptor, TripUpdate};

pub(crate) fn event(time: i64) -> StopTimeEvent {
    StopTimeEvent {
        time: Some(time),
        ..Default::default()
    }
}

pub(crate) fn stop_time(stop_id: &str, arrival: Option<i64>, departure: Option<i64>) -> StopTimeUpdate {
    StopTimeUpdate {
        stop_id: Some(stop_id.to_string()),
        arrival: arrival.map(event),
        departure: departure.map(event),
        ..Default::default()
    }
}

pub(crate) fn trip_entity(id: &str, trip_id: &str, updates: Vec<StopTimeUpdate>) -> FeedEntity {
    FeedEntity {
        id: id.to_string(),
        trip_update: Some(TripUpdate {
            trip: TripDescriptor {
                trip_id: Some(trip_id.to_string()),
                ..Default::default()
            },
            stop_time_update: updates,
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn feed(entity: Vec<FeedEntity>) -> FeedMessage {
    FeedMessage {
        header: FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(1_700_000_000),
            ..Default::default()
        },
        entity,
    }
}

/// Encoded feed with one A trip reaching `stop_id` at `arrival` (epoch secs).
pub(crate) fn single_arrival_payload(stop_id: &str, arrival: i64) -> Vec<u8> {
    feed(vec![trip_entity(
        "1",
        "021150_A..N",
        vec![stop_time(stop_id, Some(arrival), None)],
    )])
    .encode_to_vec()
}

pub(crate) fn record(line: Line, arrival_time: DateTime<Utc>) -> ArrivalRecord {
    ArrivalRecord {
        line,
        destination: DEFAULT_DESTINATION.to_string(),
        arrival_time,
        arrival_time_str: format_clock(arrival_time),
        minutes_away: 0,
    }
}
