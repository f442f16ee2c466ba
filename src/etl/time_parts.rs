//! Time dimension decomposition of epoch-millisecond timestamps.

use super::rows::TimeRow;
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Text form of `time.start_time` and `songplays.start_time`.
const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Decomposes a UTC epoch-millisecond timestamp into its calendar parts.
///
/// Pure function of `ts_millis`. `week` is the ISO 8601 week number while
/// `year` is the calendar year, so the last days of December may fall in
/// week 1. Returns `None` when the timestamp is outside the range chrono
/// can represent.
pub fn decompose(ts_millis: i64) -> Option<TimeRow> {
    let instant: DateTime<Utc> = DateTime::from_timestamp_millis(ts_millis)?;
    Some(TimeRow {
        start_time: instant.format(START_TIME_FORMAT).to_string(),
        hour: instant.hour(),
        day: instant.day(),
        week: instant.iso_week().week(),
        month: instant.month(),
        year: instant.year(),
        weekday: instant.weekday().num_days_from_monday(),
    })
}
