//! Ordering and per-line limits for extracted arrivals.

use crate::arrivals::types::{ArrivalRecord, Line, LineArrivals};

/// Sorted, limited arrivals ready to be placed on a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated {
    /// Soonest `2 * per_line_limit` arrivals across all lines.
    pub all: Vec<ArrivalRecord>,
    /// Soonest `per_line_limit` arrivals of each line, in [`Line::ALL`] order.
    pub lines: Vec<LineArrivals>,
}

/// Sorts `records` by arrival time and slices them per line and overall.
///
/// `all` is cut from the globally sorted list on its own, not assembled from
/// the per-line lists, so one busy line can fill it even while the other
/// line's list is non-empty.
pub fn aggregate_arrivals(mut records: Vec<ArrivalRecord>, per_line_limit: usize) -> Aggregated {
    records.sort_by_key(|r| r.arrival_time);

    let lines = Line::ALL
        .into_iter()
        .map(|line| LineArrivals {
            line,
            arrivals: records
                .iter()
                .filter(|r| r.line == line)
                .take(per_line_limit)
                .cloned()
                .collect(),
        })
        .collect();

    records.truncate(per_line_limit.saturating_mul(2));

    Aggregated {
        all: records,
        lines,
    }
}
