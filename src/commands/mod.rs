pub mod calendar;
pub mod init;
pub mod login;
pub mod token;
pub mod watch;

use chrono::{DateTime, Local, Utc};

/// Format an expiry instant in local time, e.g. "Mon Sep 2 10:00"
pub fn format_expiry(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%a %b %-d %H:%M").to_string()
}
