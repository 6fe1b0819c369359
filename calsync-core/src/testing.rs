//! In-memory collaborators for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{CalSyncError, CalSyncResult};
use crate::event::{Event, NewEvent, RemoteEventRecord};
use crate::remote::RemoteEventGateway;
use crate::widget::{CalendarWidget, Notification, NotificationSink};

pub fn record(id: &str, subject: &str, start: &str, end: &str) -> RemoteEventRecord {
    RemoteEventRecord {
        id: id.to_string(),
        subject: Some(subject.to_string()),
        start_date_time: Some(start.to_string()),
        end_date_time: Some(end.to_string()),
        is_all_day_event: None,
    }
}

/// A remote store held in memory, with switches to make calls fail.
#[derive(Default)]
pub struct MemoryGateway {
    records: Mutex<Vec<RemoteEventRecord>>,
    created: Mutex<Vec<NewEvent>>,
    deleted: Mutex<Vec<String>>,
    next_ids: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
    create_gate: Mutex<Option<Arc<Notify>>>,
    list_gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryGateway {
    pub fn with_records(records: Vec<RemoteEventRecord>) -> Self {
        MemoryGateway {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Ids handed out by `create`, in order.
    pub fn assign_ids(&self, ids: &[&str]) {
        *self.next_ids.lock().unwrap() = ids.iter().rev().map(|s| s.to_string()).collect();
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Make `create` wait until the returned `Notify` is signalled.
    pub fn hold_creates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.create_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Make `list` take its snapshot, then wait for the returned `Notify`
    /// before answering with it.
    pub fn hold_lists(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Change the store behind the client's back.
    pub fn insert_remotely(&self, record: RemoteEventRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn records(&self) -> Vec<RemoteEventRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<NewEvent> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteEventGateway for MemoryGateway {
    async fn list(&self) -> CalSyncResult<Vec<RemoteEventRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(CalSyncError::Provider("list failed".into()));
        }
        let records = self.records();

        let gate = self.list_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(records)
    }

    async fn create(&self, event: &NewEvent) -> CalSyncResult<String> {
        let gate = self.create_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.created.lock().unwrap().push(event.clone());
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(CalSyncError::Provider("create failed".into()));
        }

        let mut records = self.records.lock().unwrap();
        let id = self
            .next_ids
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| format!("gen{:03}", records.len() + 1));
        records.push(RemoteEventRecord {
            id: id.clone(),
            subject: Some(event.title.clone()),
            start_date_time: Some(event.start.clone()),
            end_date_time: Some(event.end.clone()),
            is_all_day_event: Some(false),
        });
        Ok(id)
    }

    async fn delete(&self, event_id: &str) -> CalSyncResult<()> {
        self.deleted.lock().unwrap().push(event_id.to_string());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(CalSyncError::Provider("delete failed".into()));
        }

        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != event_id);
        if records.len() == before {
            return Err(CalSyncError::EventNotFound(event_id.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetCall {
    RenderInitial(Vec<Event>),
    RenderOne(Event),
    RemoveOne(String),
}

/// A widget that records every call and tracks which ids it shows.
#[derive(Default)]
pub struct RecordingWidget {
    calls: Mutex<Vec<WidgetCall>>,
    initialised: AtomicBool,
}

impl RecordingWidget {
    pub fn calls(&self) -> Vec<WidgetCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn initialised(&self) -> bool {
        self.initialised.load(Ordering::SeqCst)
    }

    pub fn render_initial_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, WidgetCall::RenderInitial(_)))
            .count()
    }

    /// Ids currently on screen, in the order they were rendered.
    pub fn shown_ids(&self) -> Vec<String> {
        let mut shown: Vec<String> = Vec::new();
        for call in self.calls() {
            match call {
                WidgetCall::RenderInitial(events) => {
                    shown.extend(events.into_iter().map(|e| e.id));
                }
                WidgetCall::RenderOne(event) => shown.push(event.id),
                WidgetCall::RemoveOne(id) => shown.retain(|s| *s != id),
            }
        }
        shown
    }
}

impl CalendarWidget for RecordingWidget {
    fn initialise(&self, _options: &crate::config::CalendarOptions) {
        self.initialised.store(true, Ordering::SeqCst);
    }

    fn render_initial(&self, events: &[Event]) {
        self.calls
            .lock()
            .unwrap()
            .push(WidgetCall::RenderInitial(events.to_vec()));
    }

    fn render_one(&self, event: &Event) {
        self.calls
            .lock()
            .unwrap()
            .push(WidgetCall::RenderOne(event.clone()));
    }

    fn remove_one(&self, event_id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(WidgetCall::RemoveOne(event_id.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}
