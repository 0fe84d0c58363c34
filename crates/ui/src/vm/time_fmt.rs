use chrono::{DateTime, Utc};

/// Short, locale-free timestamp for result screens.
#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}
