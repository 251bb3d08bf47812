//! Grouping expanded occurrences into calendar days.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ScheduleResult;
use crate::format::{parse_display_date, parse_start_minutes};
use crate::recurrence::expand_all;
use crate::schedule::{CalendarBadge, DateGroup, EventOccurrence, ScheduleRecord};

/// Group occurrences by display date.
///
/// Groups come out in ascending calendar order, and occurrences inside a group
/// in ascending start time. Both keys are parsed back from the display strings;
/// the strings themselves are never compared for ordering. Sorting is stable, so
/// occurrences with the same start time keep their input order.
pub fn group_and_sort(occurrences: Vec<EventOccurrence>) -> ScheduleResult<Vec<DateGroup>> {
    let mut keyed = occurrences
        .into_iter()
        .map(|occurrence| {
            let day = parse_display_date(&occurrence.date)?;
            let start = parse_start_minutes(&occurrence.time)?;
            Ok((day, start, occurrence))
        })
        .collect::<ScheduleResult<Vec<_>>>()?;

    keyed.sort_by_key(|(day, _, _)| *day);

    let mut groups: Vec<(String, Vec<(u32, EventOccurrence)>)> = Vec::new();
    let mut index_by_date: HashMap<String, usize> = HashMap::new();

    for (_, start, occurrence) in keyed {
        let index = *index_by_date
            .entry(occurrence.date.clone())
            .or_insert_with(|| {
                groups.push((occurrence.date.clone(), Vec::new()));
                groups.len() - 1
            });
        groups[index].1.push((start, occurrence));
    }

    debug!(groups = groups.len(), "Grouped occurrences by date");

    Ok(groups
        .into_iter()
        .map(|(date, mut entries)| {
            entries.sort_by_key(|(start, _)| *start);
            DateGroup {
                date,
                data: entries.into_iter().map(|(_, occurrence)| occurrence).collect(),
            }
        })
        .collect())
}

/// Concatenate the occurrences of every group, in display order.
pub fn flatten(groups: Vec<DateGroup>) -> Vec<EventOccurrence> {
    groups.into_iter().flat_map(|group| group.data).collect()
}

/// Expand every record and group the result: the full calendar view.
pub fn build_calendar(records: &[ScheduleRecord]) -> ScheduleResult<Vec<DateGroup>> {
    group_and_sort(expand_all(records)?)
}

/// Labels to draw in the calendar cell for `day`.
pub fn badges_for_day(groups: &[DateGroup], day: NaiveDate) -> Vec<CalendarBadge> {
    groups
        .iter()
        .filter(|group| parse_display_date(&group.date).is_ok_and(|date| date == day))
        .flat_map(|group| &group.data)
        .map(|occurrence| CalendarBadge {
            color: occurrence.color.clone(),
            content: occurrence.title.clone(),
        })
        .collect()
}
