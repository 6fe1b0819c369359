//! Core of calsync: keeps a calendar widget in step with a remote event store.
//!
//! - `remote`: the server boundary (`RemoteEventGateway`) and the provider
//!   subprocess protocol that implements it
//! - `cache`: the in-memory event list
//! - `form`: the "new event" modal state
//! - `sync`: `CalendarSync`, which coordinates saves and deletes
//! - `widget`: traits for the calendar widget and the toast sink

pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod form;
pub mod remote;
pub mod sync;
pub mod widget;

#[cfg(test)]
mod testing;

pub use cache::EventCache;
pub use config::{CalendarOptions, Messages, SyncConfig};
pub use error::{CalSyncError, CalSyncResult};
pub use event::{Event, NewEvent, RemoteEventRecord, normalize_timestamp};
pub use form::{Draft, FormController, FormState};
pub use remote::{Remote, RemoteEventGateway};
pub use sync::CalendarSync;
pub use widget::{CalendarWidget, Notification, NotificationSink, Severity};
