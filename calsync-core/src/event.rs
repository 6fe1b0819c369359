//! Event types shared by the cache, the widget and the remote store.
//!
//! The remote store speaks in `RemoteEventRecord`s (field names as the server
//! sends them). Everything on the client side works with the canonical
//! `Event`, which is the shape the calendar widget renders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Suffix every timestamp sent to the server must carry (UTC, millisecond precision).
pub const UTC_MILLIS_SUFFIX: &str = ".000Z";

/// A saved calendar event, as held by the cache and rendered by the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Server-assigned id, never empty
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub all_day: bool,
}

impl Event {
    /// Build the canonical event for a record the server just accepted.
    pub fn from_created(new_event: NewEvent, id: String) -> Self {
        Event {
            id,
            title: new_event.title,
            start: new_event.start,
            end: new_event.end,
            all_day: false,
        }
    }
}

/// An event as stored on the server.
///
/// Everything but the id may come back null. One bad record must not stop
/// the rest of the list from being read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteEventRecord {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub start_date_time: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<String>,
    #[serde(default)]
    pub is_all_day_event: Option<bool>,
}

impl From<RemoteEventRecord> for Event {
    /// Missing title becomes empty, missing end becomes the start. A record
    /// without a start maps to an empty `start`; the cache skips those.
    fn from(record: RemoteEventRecord) -> Self {
        let start = record.start_date_time.unwrap_or_default();
        Event {
            id: record.id,
            title: record.subject.unwrap_or_default(),
            end: record.end_date_time.unwrap_or_else(|| start.clone()),
            start,
            all_day: record.is_all_day_event.unwrap_or(false),
        }
    }
}

/// Payload of a create call. The server answers with the new id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start: String,
    pub end: String,
}

/// Append `.000Z` unless the value already ends with it.
///
/// Applying this twice gives the same result as applying it once.
pub fn normalize_timestamp(raw: &str) -> String {
    if raw.ends_with(UTC_MILLIS_SUFFIX) {
        raw.to_string()
    } else {
        format!("{raw}{UTC_MILLIS_SUFFIX}")
    }
}

/// Parse a normalized timestamp. Returns None if it isn't valid RFC 3339.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
