//! Interfaces to the UI collaborators: the calendar widget and the toast sink.

use serde::{Deserialize, Serialize};

use crate::config::CalendarOptions;
use crate::event::Event;

/// Imperative rendering surface of the calendar widget.
///
/// Implementations wrap whatever calendar library draws the grid. The sync
/// core only ever talks to the widget through this trait.
pub trait CalendarWidget: Send + Sync {
    /// Called once on mount, before any events are rendered.
    fn initialise(&self, _options: &CalendarOptions) {}

    fn render_initial(&self, events: &[Event]);

    fn render_one(&self, event: &Event);

    fn remove_one(&self, event_id: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// Where user-facing toasts go.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}
