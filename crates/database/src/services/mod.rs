pub mod attendance;
pub mod chat;
pub mod class;
pub mod complaint;
pub mod dashboard;
pub mod department;
pub mod grade;
pub mod notice;
pub mod subject;
pub mod timetable;
pub mod user;

use chrono::{NaiveDateTime, Utc};

/// Timestamps are stored as naive UTC
pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Normalises a 1-based page request the way the list endpoints expect
pub(crate) fn page_bounds(page: u64, per_page: u64) -> (u64, u64) {
    (page.max(1), per_page.clamp(1, 100))
}

/// Trims a string and drops it when nothing is left
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
