//! Arrival extraction, ordering, and display formatting.
//!
//! Turns a decoded GTFS-RT feed into per-line arrival lists for one stop.

pub mod aggregate;
pub mod display;
pub mod extract;
pub mod types;

pub use aggregate::{Aggregated, aggregate_arrivals};
pub use extract::{extract_arrivals, minutes_away};
pub use types::{ArrivalRecord, ArrivalSnapshot, DEFAULT_DESTINATION, Line, LineArrivals};
