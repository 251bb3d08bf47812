//! Schedule records as returned by the API, and the calendar types derived
//! from them.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ScheduleError, ScheduleResult};

/// A recurring schedule entry, as listed by the `schedules/all/` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    /// First possible occurrence.
    #[serde(deserialize_with = "deserialize_start_date")]
    pub start_date: NaiveDate,
    /// "HH:MM:SS", 24-hour. Validated when the record is expanded.
    pub start_time: String,
    pub end_time: String,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    /// Occurrences recur every `frequency_per_week` weeks.
    #[serde(default = "default_count", deserialize_with = "deserialize_count")]
    pub frequency_per_week: u32,
    #[serde(default = "default_count", deserialize_with = "deserialize_count")]
    pub number_of_instances: u32,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_count() -> u32 {
    1
}

/// Missing and null counts fall back to 1. Zero is kept so that expansion can
/// reject it.
fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_count))
}

/// Accepts "2024-01-01" as well as full ISO datetimes, keeping only the date.
fn deserialize_start_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_start_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid start_date '{raw}', expected YYYY-MM-DD"
        ))
    })
}

fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// One concrete occurrence of a schedule record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOccurrence {
    /// Long-form display date, e.g. "Monday, January 01, 2024".
    pub date: String,
    /// Display time range, e.g. "1:00PM - 2:00PM".
    pub time: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// All occurrences that share one display date: one calendar cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateGroup {
    pub date: String,
    pub data: Vec<EventOccurrence>,
}

/// A colored label shown inside a calendar cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarBadge {
    pub color: Option<String>,
    pub content: String,
}

/// Parse the body of the "list all schedules" endpoint.
pub fn records_from_json(body: &str) -> ScheduleResult<Vec<ScheduleRecord>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ScheduleError::MalformedInput(format!("response is not JSON: {e}")))?;
    records_from_value(value)
}

/// Convert an already-decoded JSON payload into schedule records.
///
/// The payload must be an array; each element must have the record shape.
/// The first offending element is reported by index.
pub fn records_from_value(value: Value) -> ScheduleResult<Vec<ScheduleRecord>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ScheduleError::MalformedInput(format!(
                "expected an array of schedules, found {}",
                json_kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| ScheduleError::MalformedInput(format!("schedule #{index}: {e}")))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
