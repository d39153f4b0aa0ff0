//! Wall-clock rendering in the station's civil timezone.

use chrono::{DateTime, Utc};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

/// Timezone all display strings are rendered in.
pub const DISPLAY_TZ: Tz = New_York;

/// Placeholder shown when no feed data backs a snapshot.
pub const NOT_AVAILABLE: &str = "N/A";

/// `2:35 PM`
pub fn format_clock(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&DISPLAY_TZ).format("%-I:%M %p").to_string()
}

/// `Oct 19`
pub fn format_date(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&DISPLAY_TZ).format("%b %-d").to_string()
}

/// `Oct 19, 02:35 PM`
pub fn format_last_updated(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&DISPLAY_TZ)
        .format("%b %-d, %I:%M %p")
        .to_string()
}
