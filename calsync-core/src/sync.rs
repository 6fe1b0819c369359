//! Save and delete coordination between the form, the server, the cache and
//! the widget.
//!
//! A save closes the form straight away and only touches the cache and the
//! widget once the server has answered with the new id. A delete removes the
//! event from the widget and then reloads the whole list from the server, so
//! changes made elsewhere show up too.
//!
//! Only one save or delete runs at a time. Starting another while one is in
//! flight is rejected with `CalSyncError::Busy`. A delete keeps others out
//! until its reload has finished.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::cache::EventCache;
use crate::config::{CalendarOptions, Messages, SyncConfig};
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::{Event, NewEvent, normalize_timestamp, parse_timestamp};
use crate::form::{Draft, FormController, FormState};
use crate::remote::RemoteEventGateway;
use crate::widget::{CalendarWidget, Notification, NotificationSink, Severity};

/// Shows the spinner for as long as it is alive.
struct Spinner<'a> {
    busy: &'a watch::Sender<bool>,
}

impl<'a> Spinner<'a> {
    fn start(busy: &'a watch::Sender<bool>) -> Self {
        busy.send_replace(true);
        Spinner { busy }
    }
}

impl Drop for Spinner<'_> {
    fn drop(&mut self) {
        self.busy.send_replace(false);
    }
}

/// A save or delete in flight. Holds the change lock until dropped, on every
/// exit path. The spinner can be stopped earlier than the lock is released.
struct InFlight<'a> {
    spinner: Option<Spinner<'a>>,
    _change: tokio::sync::MutexGuard<'a, ()>,
}

impl InFlight<'_> {
    fn stop_spinner(&mut self) {
        self.spinner.take();
    }
}

pub struct CalendarSync {
    gateway: Arc<dyn RemoteEventGateway>,
    widget: Arc<dyn CalendarWidget>,
    notifier: Arc<dyn NotificationSink>,
    cache: EventCache,
    form: Mutex<FormController>,
    busy: watch::Sender<bool>,
    changes: tokio::sync::Mutex<()>,
    messages: Messages,
    options: CalendarOptions,
}

impl CalendarSync {
    pub fn new(
        gateway: Arc<dyn RemoteEventGateway>,
        widget: Arc<dyn CalendarWidget>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let (busy, _) = watch::channel(false);
        CalendarSync {
            cache: EventCache::new(gateway.clone(), widget.clone()),
            gateway,
            widget,
            notifier,
            form: Mutex::new(FormController::new()),
            busy,
            changes: tokio::sync::Mutex::new(()),
            messages: Messages::default(),
            options: CalendarOptions::default(),
        }
    }

    /// Wire up against the remote described in `config`.
    pub fn from_config(
        config: &SyncConfig,
        widget: Arc<dyn CalendarWidget>,
        notifier: Arc<dyn NotificationSink>,
    ) -> CalSyncResult<Self> {
        let remote = config.remote()?;
        Ok(Self::new(Arc::new(remote), widget, notifier)
            .with_messages(config.messages.clone())
            .with_options(config.calendar.clone()))
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_options(mut self, options: CalendarOptions) -> Self {
        self.options = options;
        self
    }

    /// Set up the widget and fetch the initial event list.
    ///
    /// Finding no events is not an error here: the list is just empty.
    pub async fn mount(&self) -> Vec<Event> {
        self.widget.initialise(&self.options);
        match self.cache.load().await {
            Ok(events) => events,
            Err(e) => {
                debug!(error = %e, "mounted without events");
                Vec::new()
            }
        }
    }

    pub async fn refresh(&self) -> CalSyncResult<Vec<Event>> {
        self.cache.load().await
    }

    pub fn cache(&self) -> &EventCache {
        &self.cache
    }

    pub fn events(&self) -> Vec<Event> {
        self.cache.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Event>> {
        self.cache.subscribe()
    }

    pub fn busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Follow the busy flag, e.g. to drive a spinner.
    pub fn watch_busy(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    // FORM:

    fn form(&self) -> MutexGuard<'_, FormController> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn form_state(&self) -> FormState {
        self.form().state().clone()
    }

    pub fn open_new(&self) {
        self.form().open_new();
    }

    /// The user dragged across a time range on the calendar.
    ///
    /// Values are kept as given. Date-only values from the month view
    /// (`2024-01-01`) are read as midnight UTC when the draft is saved.
    pub fn select_range(&self, start: &str, end: &str) {
        self.form().open_for_range(start, end);
    }

    pub fn set_title(&self, title: &str) {
        self.form().set_title(title);
    }

    pub fn set_start(&self, start: &str) {
        self.form().set_start(start);
    }

    pub fn set_end(&self, end: &str) {
        self.form().set_end(end);
    }

    pub fn cancel(&self) {
        self.form().cancel();
    }

    /// Save whatever the open form currently holds.
    pub async fn submit(&self) -> CalSyncResult<Event> {
        let draft = self.form().draft().cloned().ok_or(CalSyncError::FormClosed)?;
        self.save(draft).await
    }

    // CHANGES:

    /// Create an event from `draft`.
    ///
    /// The form is closed before the server answers. Invalid drafts and
    /// rejected (busy) saves leave the form untouched.
    pub async fn save(&self, draft: Draft) -> CalSyncResult<Event> {
        let guard = self.begin_change()?;

        let new_event = match prepare(draft) {
            Ok(new_event) => new_event,
            Err(e) => {
                drop(guard);
                warn!(error = %e, "refusing to save draft");
                self.notify_error(e.to_string());
                return Err(e);
            }
        };

        self.form().cancel();

        let result = match self.gateway.create(&new_event).await {
            Ok(id) if id.is_empty() => Err(CalSyncError::Provider(
                "Server returned an empty event id".into(),
            )),
            other => other,
        };

        match result {
            Ok(id) => {
                let event = Event::from_created(new_event, id);
                self.widget.render_one(&event);
                self.cache.append(event.clone());
                drop(guard);

                info!(id = %event.id, title = %event.title, "event saved");
                self.notifier.notify(Notification {
                    title: self.messages.created_title.clone(),
                    message: self.messages.created_message.clone(),
                    severity: Severity::Success,
                });
                Ok(event)
            }
            Err(e) => {
                drop(guard);
                error!(error = %e, title = %new_event.title, "failed to save event");
                self.notify_error(self.messages.create_failed_message.clone());
                Err(e)
            }
        }
    }

    /// Delete an event on the server, then reload the list from it.
    pub async fn remove(&self, event_id: &str) -> CalSyncResult<()> {
        let mut guard = self.begin_change()?;

        if let Err(e) = self.gateway.delete(event_id).await {
            drop(guard);
            error!(error = %e, %event_id, "failed to delete event");
            self.notify_error(self.messages.delete_failed_message.clone());
            return Err(e);
        }

        self.widget.remove_one(event_id);
        guard.stop_spinner();
        info!(%event_id, "event deleted");

        // Still holding the change lock: a save finishing during the reload
        // would be wiped by the older list.
        if let Err(e) = self.cache.load().await {
            debug!(error = %e, "reload after delete found no events");
        }
        drop(guard);
        Ok(())
    }

    fn begin_change(&self) -> CalSyncResult<InFlight<'_>> {
        let change = self.changes.try_lock().map_err(|_| {
            warn!("change rejected, another one is still in progress");
            self.notify_error(self.messages.busy_message.clone());
            CalSyncError::Busy
        })?;
        Ok(InFlight {
            spinner: Some(Spinner::start(&self.busy)),
            _change: change,
        })
    }

    fn notify_error(&self, message: String) {
        self.notifier.notify(Notification {
            title: self.messages.error_title.clone(),
            message,
            severity: Severity::Error,
        });
    }
}

/// Check a draft and turn it into the record sent to the server.
fn prepare(draft: Draft) -> CalSyncResult<NewEvent> {
    let title = draft
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CalSyncError::Validation("a title is required".into()))?;

    let start = required_timestamp(draft.start, "start")?;
    let end = required_timestamp(draft.end, "end")?;

    let (Some(start_at), Some(end_at)) = (parse_timestamp(&start), parse_timestamp(&end)) else {
        return Err(CalSyncError::Validation(format!(
            "'{start}' to '{end}' is not a valid time range"
        )));
    };
    if end_at < start_at {
        return Err(CalSyncError::Validation(
            "the event cannot end before it starts".into(),
        ));
    }

    Ok(NewEvent { title, start, end })
}

fn required_timestamp(value: Option<String>, field: &str) -> CalSyncResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| normalize_timestamp(&expand_date(v)))
        .ok_or_else(|| CalSyncError::Validation(format!("a {field} time is required")))
}

/// Month view selections are whole days (`2024-01-01`): start them at midnight UTC.
fn expand_date(value: String) -> String {
    if NaiveDate::parse_from_str(&value, "%Y-%m-%d").is_ok() {
        format!("{value}T00:00:00")
    } else {
        value
    }
}
