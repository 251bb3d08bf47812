//! Weekly recurrence expansion for schedule records.
//!
//! A record recurs on one weekday, every `frequency_per_week` weeks, for
//! `number_of_instances` occurrences starting at the first matching weekday on
//! or after its start date.

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::error::{ScheduleError, ScheduleResult};
use crate::format::{format_display_date, format_time_range, parse_time_24h};
use crate::schedule::{EventOccurrence, ScheduleRecord};

/// First date on or after `start` whose weekday is `day_of_week` (0 = Sunday).
///
/// Walks forward one day at a time, so at most six steps are taken.
pub fn anchor_date(start: NaiveDate, day_of_week: u8) -> ScheduleResult<NaiveDate> {
    if day_of_week > 6 {
        return Err(ScheduleError::MalformedInput(format!(
            "day_of_week must be between 0 and 6, got {day_of_week}"
        )));
    }

    let target = u32::from(day_of_week);
    let mut date = start;
    while date.weekday().num_days_from_sunday() != target {
        date = date.succ_opt().ok_or_else(|| out_of_range(start))?;
    }
    Ok(date)
}

/// Calendar dates of every occurrence of a record, in order.
pub fn occurrence_dates(record: &ScheduleRecord) -> ScheduleResult<Vec<NaiveDate>> {
    if record.frequency_per_week == 0 {
        return Err(ScheduleError::MalformedInput(format!(
            "frequency_per_week must be at least 1 for '{}'",
            record.title
        )));
    }
    if record.number_of_instances == 0 {
        return Err(ScheduleError::MalformedInput(format!(
            "number_of_instances must be at least 1 for '{}'",
            record.title
        )));
    }

    let anchor = anchor_date(record.start_date, record.day_of_week)?;
    let step = u64::from(record.frequency_per_week) * 7;

    (0..u64::from(record.number_of_instances))
        .map(|i| {
            anchor
                .checked_add_days(Days::new(i * step))
                .ok_or_else(|| out_of_range(anchor))
        })
        .collect()
}

/// Expand one record into its concrete occurrences.
pub fn expand(record: &ScheduleRecord) -> ScheduleResult<Vec<EventOccurrence>> {
    let start = parse_time_24h(&record.start_time)?;
    let end = parse_time_24h(&record.end_time)?;
    let time = format_time_range(start, end);

    let occurrences: Vec<EventOccurrence> = occurrence_dates(record)?
        .into_iter()
        .map(|date| EventOccurrence {
            date: format_display_date(date),
            time: time.clone(),
            title: record.title.clone(),
            kind: record.kind.clone(),
            location: record.location.clone(),
            color: record.color.clone(),
            description: record.description.clone(),
        })
        .collect();

    debug!(
        title = %record.title,
        count = occurrences.len(),
        "Expanded schedule record"
    );

    Ok(occurrences)
}

/// Expand many records, keeping input order. Stops at the first bad record.
pub fn expand_all(records: &[ScheduleRecord]) -> ScheduleResult<Vec<EventOccurrence>> {
    let mut occurrences = Vec::new();
    for record in records {
        occurrences.extend(expand(record)?);
    }
    Ok(occurrences)
}

fn out_of_range(date: NaiveDate) -> ScheduleError {
    ScheduleError::MalformedInput(format!("occurrence after {date} is out of range"))
}
