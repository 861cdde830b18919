//! Human-readable sizes and dates.

use time::macros::format_description;
use time::OffsetDateTime;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const MILLIS_PER_DAY: i128 = 24 * 60 * 60 * 1000;

/// Formats a byte count using binary multiples, rounded to two decimal places
/// with trailing zeros dropped. `GB` is the largest unit.
///
/// ```
/// use sharehub_media::format::format_size;
///
/// assert_eq!(format_size(0), "0 Bytes");
/// assert_eq!(format_size(1024), "1 KB");
/// assert_eq!(format_size(1536), "1.5 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Whole days between two instants, rounded up. Direction is ignored.
fn days_between(a: OffsetDateTime, b: OffsetDateTime) -> i128 {
    let millis = (a - b).abs().whole_milliseconds();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Formats an upload timestamp relative to `now`.
///
/// The day count is rounded up, so anything within the last 24 hours is one
/// day old ("today") and anything between 24 and 48 hours is "yesterday".
/// Three to seven days read "`n - 1` days ago"; older dates are printed in
/// full.
///
/// ```
/// use sharehub_media::format::format_relative_date;
/// use time::{Duration, macros::datetime};
///
/// let now = datetime!(2024-03-20 12:00 UTC);
/// assert_eq!(format_relative_date(now - Duration::hours(3), now), "today");
/// assert_eq!(format_relative_date(now - Duration::hours(30), now), "yesterday");
/// assert_eq!(format_relative_date(now - Duration::days(4), now), "3 days ago");
/// assert_eq!(format_relative_date(datetime!(2024-01-05 09:00 UTC), now), "5 Jan 2024");
/// ```
pub fn format_relative_date(timestamp: OffsetDateTime, now: OffsetDateTime) -> String {
    match days_between(now, timestamp) {
        // Zero only happens for the exact same instant.
        0 | 1 => "today".to_string(),
        2 => "yesterday".to_string(),
        days @ 3..=7 => format!("{} days ago", days - 1),
        _ => format_absolute_date(timestamp),
    }
}

/// Day, abbreviated month and year, e.g. `5 Jan 2024`.
pub fn format_absolute_date(timestamp: OffsetDateTime) -> String {
    let description = format_description!("[day padding:none] [month repr:short] [year]");
    timestamp.format(&description).unwrap_or_else(|_| timestamp.date().to_string())
}
