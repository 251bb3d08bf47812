use chrono::{Datelike, NaiveDate};
use schooldesk_core::format::{parse_display_date, parse_start_minutes};
use schooldesk_core::{
    ScheduleError, badges_for_day, build_calendar, expand, flatten, group_and_sort,
    records_from_json,
};
use serde_json::json;

fn schedules_body() -> String {
    json!([
        {
            "id": 1,
            "title": "Algebra",
            "start_date": "2024-01-01",
            "start_time": "13:00:00",
            "end_time": "14:00:00",
            "day_of_week": 1,
            "frequency_per_week": 2,
            "number_of_instances": 3,
            "type": "class",
            "location": "Room 12",
            "color": "blue",
            "description": "Linear equations"
        },
        {
            "id": 2,
            "title": "Homeroom",
            "start_date": "2023-12-29",
            "start_time": "09:00:00",
            "end_time": "09:30:00",
            "day_of_week": 1,
            "frequency_per_week": 1,
            "number_of_instances": 5,
            "type": "meeting",
            "location": "Room 1",
            "color": "red",
            "description": null
        },
        {
            "id": 3,
            "title": "Staff briefing",
            "start_date": "2024-01-01",
            "start_time": "08:00:00",
            "end_time": "08:45:00",
            "day_of_week": 1,
            "number_of_instances": 1,
            "type": "meeting",
            "location": "Library",
            "color": "gold",
            "description": "Start of term"
        }
    ])
    .to_string()
}

#[test_log::test]
fn test_biweekly_scenario() {
    let records = records_from_json(&schedules_body()).unwrap();
    let occurrences = expand(&records[0]).unwrap();

    let days: Vec<NaiveDate> = occurrences
        .iter()
        .map(|o| parse_display_date(&o.date).unwrap())
        .collect();
    assert_eq!(
        days,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 29).unwrap(),
        ]
    );
    assert!(occurrences.iter().all(|o| o.time == "1:00PM - 2:00PM"));
    assert!(occurrences.iter().all(|o| o.location.as_deref() == Some("Room 12")));
}

#[test_log::test]
fn test_calendar_is_ordered_by_day_then_start_time() {
    let records = records_from_json(&schedules_body()).unwrap();
    let groups = build_calendar(&records).unwrap();

    // Homeroom starts 2023-12-29 (a Friday) and anchors on Monday 2024-01-01
    assert_eq!(groups[0].date, "Monday, January 01, 2024");
    let first_day: Vec<_> = groups[0].data.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(first_day, vec!["Staff briefing", "Homeroom", "Algebra"]);

    let mut previous_day = None;
    for group in &groups {
        let day = parse_display_date(&group.date).unwrap();
        assert_eq!(day.weekday().num_days_from_sunday(), 1);
        if let Some(previous) = previous_day {
            assert!(previous < day);
        }
        previous_day = Some(day);

        let starts: Vec<u32> = group
            .data
            .iter()
            .map(|o| parse_start_minutes(&o.time).unwrap())
            .collect();
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        assert!(group.data.iter().all(|o| o.date == group.date));
    }

    let total: usize = groups.iter().map(|g| g.data.len()).sum();
    assert_eq!(total, 3 + 5 + 1);
}

#[test_log::test]
fn test_grouping_is_idempotent() {
    let records = records_from_json(&schedules_body()).unwrap();
    let groups = build_calendar(&records).unwrap();

    assert_eq!(group_and_sort(flatten(groups.clone())).unwrap(), groups);
}

#[test_log::test]
fn test_earlier_start_comes_first_on_shared_day() {
    let body = json!([
        {
            "title": "Late",
            "start_date": "2024-03-04",
            "start_time": "09:00:00",
            "end_time": "10:00:00",
            "day_of_week": 1,
            "frequency_per_week": 1,
            "number_of_instances": 1
        },
        {
            "title": "Early",
            "start_date": "2024-03-04",
            "start_time": "08:00:00",
            "end_time": "09:00:00",
            "day_of_week": 1,
            "frequency_per_week": 1,
            "number_of_instances": 1
        }
    ])
    .to_string();

    let groups = build_calendar(&records_from_json(&body).unwrap()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].data[0].title, "Early");
    assert_eq!(groups[0].data[0].time, "8:00AM - 9:00AM");
    assert_eq!(groups[0].data[1].title, "Late");
}

#[test_log::test]
fn test_groups_serialize_as_date_and_data() {
    let records = records_from_json(&schedules_body()).unwrap();
    let groups = build_calendar(&records[2..]).unwrap();

    let value = serde_json::to_value(&groups).unwrap();
    assert_eq!(
        value,
        json!([{
            "date": "Monday, January 01, 2024",
            "data": [{
                "date": "Monday, January 01, 2024",
                "time": "8:00AM - 8:45AM",
                "title": "Staff briefing",
                "type": "meeting",
                "location": "Library",
                "color": "gold",
                "description": "Start of term"
            }]
        }])
    );
}

#[test_log::test]
fn test_calendar_cell_badges() {
    let records = records_from_json(&schedules_body()).unwrap();
    let groups = build_calendar(&records).unwrap();

    let badges = badges_for_day(&groups, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    let labels: Vec<_> = badges
        .iter()
        .map(|b| (b.content.as_str(), b.color.as_deref()))
        .collect();
    assert_eq!(labels, vec![("Homeroom", Some("red")), ("Algebra", Some("blue"))]);
}

#[test_log::test]
fn test_bad_record_fails_the_whole_calendar() {
    let body = json!([{
        "title": "Broken",
        "start_date": "2024-01-01",
        "start_time": "9am",
        "end_time": "10:00:00",
        "day_of_week": 1
    }])
    .to_string();

    let records = records_from_json(&body).unwrap();
    assert!(matches!(
        build_calendar(&records),
        Err(ScheduleError::InvalidFormat { what: "time", .. })
    ));

    assert!(matches!(
        records_from_json(r#"{"detail": "Authentication credentials were not provided."}"#),
        Err(ScheduleError::MalformedInput(_))
    ));
}
