//! Output formatting for arrival snapshots and feed summaries.
//!
//! Supports pretty-printing, JSON serialization, and a plain-text board.

use anyhow::Result;
use serde::Serialize;
use std::fmt::{Debug, Write};
use tracing::{debug, info};

use crate::arrivals::ArrivalSnapshot;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", to_json(value)?);
    Ok(())
}

pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Renders a snapshot as a text departure board, one column block per line.
pub fn render_board(snapshot: &ArrivalSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} (to {})    {}  {}",
        snapshot.station_name, snapshot.direction, snapshot.current_time, snapshot.current_date
    );

    for line in &snapshot.lines {
        let _ = writeln!(out, "{} Train", line.line);
        if line.arrivals.is_empty() {
            let _ = writeln!(out, "  No {} trains", line.line);
            continue;
        }
        for arrival in &line.arrivals {
            let _ = writeln!(
                out,
                "  {:>8}  {:>3} min",
                arrival.arrival_time_str, arrival.minutes_away
            );
        }
    }

    let _ = write!(out, "Last updated: {}", snapshot.last_updated);
    out
}
