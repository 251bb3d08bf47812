//! Display formats shared by the expander, the grouper and the CLI.
//!
//! Dates are shown long-form ("Monday, January 01, 2024") and times on a
//! 12-hour clock ("1:00PM"). The grouper needs to read both back, so each
//! formatter has a matching parser.

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::error::{ScheduleError, ScheduleResult};

const DISPLAY_DATE_FORMAT: &str = "%A, %B %d, %Y";

/// Separator between the start and end time of an occurrence.
pub const TIME_RANGE_SEPARATOR: &str = " - ";

/// Format a date as "Monday, January 01, 2024".
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Parse a display date back into a calendar date.
///
/// Commas are optional and runs of whitespace are collapsed, so both
/// "Monday, January 01, 2024" and "Monday January 01 2024" are accepted.
/// A weekday that disagrees with the date is rejected.
pub fn parse_display_date(s: &str) -> ScheduleResult<NaiveDate> {
    let normalized = s.replace(',', " ");
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    NaiveDate::parse_from_str(&normalized, "%A %B %d %Y")
        .map_err(|_| ScheduleError::invalid("display date", s))
}

/// Parse a 24-hour time of day, "HH:MM:SS" (or "HH:MM").
pub fn parse_time_24h(s: &str) -> ScheduleResult<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ScheduleError::invalid("time", s))
}

/// Format a time of day on a 12-hour clock: "1:00PM", "12:05AM".
pub fn format_time_12h(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { "PM" } else { "AM" };
    format!("{}:{:02}{}", hour, time.minute(), suffix)
}

/// Build the "start - end" range shown for an occurrence.
pub fn format_time_range(start: NaiveTime, end: NaiveTime) -> String {
    format!(
        "{}{}{}",
        format_time_12h(start),
        TIME_RANGE_SEPARATOR,
        format_time_12h(end)
    )
}

/// Parse a 12-hour time ("1:00PM", "12:30 am") into minutes since midnight.
pub fn parse_time_12h(s: &str) -> ScheduleResult<u32> {
    let invalid = || ScheduleError::invalid("12-hour time", s);
    let trimmed = s.trim();

    if trimmed.len() < 2 || !trimmed.is_char_boundary(trimmed.len() - 2) {
        return Err(invalid());
    }
    let (clock, suffix) = trimmed.split_at(trimmed.len() - 2);
    let is_pm = match suffix.to_ascii_uppercase().as_str() {
        "AM" => false,
        "PM" => true,
        _ => return Err(invalid()),
    };

    let (hour, minute) = clock.trim_end().split_once(':').ok_or_else(invalid)?;
    if minute.len() != 2 || !minute.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(invalid());
    }

    let hour24 = hour % 12 + if is_pm { 12 } else { 0 };
    Ok(hour24 * 60 + minute)
}

/// Minutes since midnight of the start of a "start - end" time range.
pub fn parse_start_minutes(time_range: &str) -> ScheduleResult<u32> {
    let start = time_range
        .split_once(TIME_RANGE_SEPARATOR)
        .map_or(time_range, |(start, _)| start);
    parse_time_12h(start).map_err(|_| ScheduleError::invalid("time range", time_range))
}
