//! Timestamp normalization for the availability column.

use chrono::NaiveDateTime;

/// Output layout for every recognized timestamp.
pub const NORMALIZED_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Input layouts, in priority order.
pub const INPUT_FORMATS: [&str; 3] = ["%d.%m.%Y %H:%M", "%d.%m.%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Reformat a timestamp as `DD.MM.YYYY HH:MM`.
///
/// Unrecognized input is returned unchanged so a malformed export still
/// produces a report.
pub fn normalize_datetime(value: &str) -> String {
    if !has_timestamp_shape(value) {
        return value.to_string();
    }

    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.format(NORMALIZED_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}

/// chrono accepts a 1-3 digit `%Y` and a missing date/time separator; the
/// recognized layouts require a four-digit year and whitespace between the
/// date and the time.
fn has_timestamp_shape(value: &str) -> bool {
    let Some((date, time)) = value.split_once(char::is_whitespace) else {
        return false;
    };
    if date.is_empty() || time.trim_start().is_empty() {
        return false;
    }

    let year = if date.contains('-') {
        date.split('-').next()
    } else {
        date.rsplit('.').next()
    };
    year.is_some_and(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))
}
