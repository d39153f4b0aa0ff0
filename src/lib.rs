//! Live subway arrival boards from the MTA GTFS-Realtime feed.
//!
//! fetch → decode → extract → aggregate, behind a short-lived cache.
//! [`service::SubwayService::get_data`] is the entry point.

pub mod arrivals;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod service;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
