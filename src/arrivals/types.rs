//! Value types produced by the arrival pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::arrivals::aggregate::Aggregated;
use crate::arrivals::display::{NOT_AVAILABLE, format_clock, format_date, format_last_updated};

/// Display label attached to every arrival.
pub const DEFAULT_DESTINATION: &str = "Manhattan";

/// Subway lines recognized in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Line {
    A,
    C,
}

impl Line {
    /// Every recognized line, in classification and display order.
    pub const ALL: [Line; 2] = [Line::A, Line::C];

    /// Substring of the trip id that marks a trip as running on this line,
    /// e.g. `021150_A..N`.
    pub fn marker(self) -> &'static str {
        match self {
            Line::A => "_A",
            Line::C => "_C",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Line::A => "A",
            Line::C => "C",
        }
    }

    /// Classifies a trip by marker substring. Markers are tried in
    /// [`Line::ALL`] order; the first hit wins.
    pub fn from_trip_id(trip_id: &str) -> Option<Line> {
        Line::ALL
            .into_iter()
            .find(|line| trip_id.contains(line.marker()))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One predicted train arrival at the target stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalRecord {
    pub line: Line,
    pub destination: String,
    pub arrival_time: DateTime<Utc>,
    /// Arrival rendered as local wall-clock time, e.g. `2:35 PM`.
    pub arrival_time_str: String,
    pub minutes_away: i64,
}

/// Upcoming arrivals for a single line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineArrivals {
    pub line: Line,
    pub arrivals: Vec<ArrivalRecord>,
}

/// Everything a display needs to render one station board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalSnapshot {
    pub station_name: String,
    pub direction: String,
    /// Soonest arrivals across all lines.
    pub arrivals: Vec<ArrivalRecord>,
    /// One entry per [`Line::ALL`], present even when empty.
    pub lines: Vec<LineArrivals>,
    pub generated_at: DateTime<Utc>,
    pub last_updated: String,
    pub current_time: String,
    pub current_date: String,
}

impl ArrivalSnapshot {
    /// Builds a snapshot whose display strings all derive from `now`.
    pub fn from_aggregated(
        station_name: impl Into<String>,
        direction: impl Into<String>,
        aggregated: Aggregated,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            station_name: station_name.into(),
            direction: direction.into(),
            arrivals: aggregated.all,
            lines: aggregated.lines,
            generated_at: now,
            last_updated: format_last_updated(now),
            current_time: format_clock(now),
            current_date: format_date(now),
        }
    }

    /// Renderable snapshot with no arrivals, used when no feed data is
    /// available. `last_updated` reads `N/A`; the clock fields stay live.
    pub fn unavailable(
        station_name: impl Into<String>,
        direction: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            station_name: station_name.into(),
            direction: direction.into(),
            arrivals: Vec::new(),
            lines: Line::ALL
                .into_iter()
                .map(|line| LineArrivals {
                    line,
                    arrivals: Vec::new(),
                })
                .collect(),
            generated_at: now,
            last_updated: NOT_AVAILABLE.to_string(),
            current_time: format_clock(now),
            current_date: format_date(now),
        }
    }

    /// Arrivals for `line`; empty if the line has none.
    pub fn for_line(&self, line: Line) -> &[ArrivalRecord] {
        self.lines
            .iter()
            .find(|l| l.line == line)
            .map(|l| l.arrivals.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty() && self.lines.iter().all(|l| l.arrivals.is_empty())
    }
}
