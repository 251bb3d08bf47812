//! Core logic for the schooldesk front end.
//!
//! - `schedule`, `recurrence` and `grouping` turn recurring schedule records
//!   from the API into per-day calendar groups
//! - `session` holds the signed-in user's token and signs out on expiry
//! - `config` loads layered settings

pub mod config;
pub mod error;
pub mod format;
pub mod grouping;
pub mod recurrence;
pub mod schedule;
pub mod session;

pub use error::{ConfigError, ScheduleError, ScheduleResult, TokenDecodeError};
pub use grouping::{badges_for_day, build_calendar, flatten, group_and_sort};
pub use recurrence::{expand, expand_all};
pub use schedule::{
    CalendarBadge, DateGroup, EventOccurrence, ScheduleRecord, records_from_json,
    records_from_value,
};
pub use session::{ExpiryCheck, ExpiryWatcher, SessionManager, SessionState};
