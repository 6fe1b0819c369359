//! In-memory copy of the server's event list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;
use crate::remote::RemoteEventGateway;
use crate::widget::CalendarWidget;

/// Holds the events last fetched from the server, in server order.
///
/// Only `load` and `append` change the list. Readers either take a snapshot
/// with `current` or follow changes through `subscribe`.
pub struct EventCache {
    gateway: Arc<dyn RemoteEventGateway>,
    widget: Arc<dyn CalendarWidget>,
    events: watch::Sender<Vec<Event>>,
    rendered: AtomicBool,
    notice: Mutex<Option<String>>,
}

impl EventCache {
    pub fn new(gateway: Arc<dyn RemoteEventGateway>, widget: Arc<dyn CalendarWidget>) -> Self {
        let (events, _) = watch::channel(Vec::new());
        EventCache {
            gateway,
            widget,
            events,
            rendered: AtomicBool::new(false),
            notice: Mutex::new(None),
        }
    }

    /// Replace the held list with a fresh fetch from the server.
    ///
    /// The first fetch that reaches the server hands its events to the widget
    /// via `render_initial`; later ones only update the cache. An empty or
    /// failed fetch empties the cache and returns `NoEventsFound`.
    pub async fn load(&self) -> CalSyncResult<Vec<Event>> {
        let records = match self.gateway.list().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to list events");
                self.replace(Vec::new());
                return Err(CalSyncError::NoEventsFound);
            }
        };

        let events: Vec<Event> = records
            .into_iter()
            .map(Event::from)
            .filter(|event| {
                let usable = !event.id.is_empty() && !event.start.is_empty();
                if !usable {
                    warn!(id = %event.id, title = %event.title, "skipping remote event without id or start");
                }
                usable
            })
            .collect();

        self.replace(events.clone());

        if !self.rendered.swap(true, Ordering::SeqCst) {
            debug!(count = events.len(), "initial render");
            self.widget.render_initial(&events);
        }

        if events.is_empty() {
            info!("no events found");
            return Err(CalSyncError::NoEventsFound);
        }

        info!(count = events.len(), "loaded events");
        Ok(events)
    }

    /// Snapshot of the held list.
    pub fn current(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Add a just-created event to the end of the list.
    pub fn append(&self, event: Event) {
        debug_assert!(!event.id.is_empty(), "only saved events enter the cache");
        self.events.send_modify(|events| events.push(event));
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.events.borrow().iter().any(|e| e.id == event_id)
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notified with the full list after every `load` and `append`.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Event>> {
        self.events.subscribe()
    }

    /// Empty-state message from the last load, if it found nothing.
    pub fn notice(&self) -> Option<String> {
        self.notice.lock().ok().and_then(|n| n.clone())
    }

    fn replace(&self, events: Vec<Event>) {
        let notice = events
            .is_empty()
            .then(|| CalSyncError::NoEventsFound.to_string());
        if let Ok(mut current) = self.notice.lock() {
            *current = notice;
        }
        self.events.send_replace(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryGateway, RecordingWidget, WidgetCall, record};

    const NINE_ISH: &str = "2024-01-03T09:00:00.000Z";

    fn two_records() -> Vec<crate::event::RemoteEventRecord> {
        vec![
            record("a001", "Standup", "2024-01-01T09:00:00.000Z", "2024-01-01T10:00:00.000Z"),
            record("a002", "Review", "2024-01-02T14:00:00.000Z", "2024-01-02T15:00:00.000Z"),
        ]
    }

    fn cache_with(gateway: Arc<MemoryGateway>) -> (EventCache, Arc<RecordingWidget>) {
        let widget = Arc::new(RecordingWidget::default());
        (EventCache::new(gateway, widget.clone()), widget)
    }

    #[tokio::test]
    async fn test_load_maps_records_and_renders_once() {
        let gateway = Arc::new(MemoryGateway::with_records(two_records()));
        let (cache, widget) = cache_with(gateway.clone());

        let events = cache.load().await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| !e.all_day));
        assert_eq!(cache.current(), events);
        assert_eq!(widget.calls(), vec![WidgetCall::RenderInitial(events.clone())]);

        cache.load().await.unwrap();
        assert_eq!(gateway.list_calls(), 2);
        assert_eq!(widget.render_initial_count(), 1);
    }

    #[tokio::test]
    async fn test_load_keeps_server_order() {
        let mut records = two_records();
        records.reverse();
        let (cache, _) = cache_with(Arc::new(MemoryGateway::with_records(records)));

        let ids: Vec<String> = cache.load().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a002", "a001"]);
    }

    #[tokio::test]
    async fn test_failed_load_empties_cache() {
        let gateway = Arc::new(MemoryGateway::with_records(two_records()));
        let (cache, widget) = cache_with(gateway.clone());
        cache.load().await.unwrap();

        gateway.fail_list(true);
        let result = cache.load().await;

        assert!(matches!(result, Err(CalSyncError::NoEventsFound)));
        assert!(cache.is_empty());
        assert_eq!(cache.notice().as_deref(), Some("No events are found"));
        assert_eq!(widget.render_initial_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_first_load_defers_initial_render() {
        let gateway = Arc::new(MemoryGateway::with_records(two_records()));
        gateway.fail_list(true);
        let (cache, widget) = cache_with(gateway.clone());

        assert!(cache.load().await.is_err());
        assert_eq!(widget.render_initial_count(), 0);

        gateway.fail_list(false);
        cache.load().await.unwrap();
        assert_eq!(widget.render_initial_count(), 1);
        assert_eq!(cache.notice(), None);
    }

    #[tokio::test]
    async fn test_empty_list_signals_not_found() {
        let (cache, widget) = cache_with(Arc::new(MemoryGateway::default()));

        assert!(matches!(cache.load().await, Err(CalSyncError::NoEventsFound)));
        assert!(cache.is_empty());
        assert_eq!(widget.calls(), vec![WidgetCall::RenderInitial(vec![])]);
    }

    #[tokio::test]
    async fn test_records_without_id_are_dropped() {
        let mut records = two_records();
        records.push(record("", "Ghost", "2024-01-03T09:00:00.000Z", "2024-01-03T10:00:00.000Z"));
        let (cache, _) = cache_with(Arc::new(MemoryGateway::with_records(records)));

        assert_eq!(cache.load().await.unwrap().len(), 2);
        assert!(cache.current().iter().all(|e| !e.id.is_empty()));
    }

    #[tokio::test]
    async fn test_records_without_start_are_dropped() {
        let mut records = two_records();
        let mut no_start = record("a003", "Floating", NINE_ISH, NINE_ISH);
        no_start.start_date_time = None;
        records.insert(0, no_start);
        let (cache, _) = cache_with(Arc::new(MemoryGateway::with_records(records)));

        let ids: Vec<String> = cache.load().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a001", "a002"]);
    }

    #[tokio::test]
    async fn test_append_and_subscribe() {
        let (cache, widget) = cache_with(Arc::new(MemoryGateway::with_records(two_records())));
        cache.load().await.unwrap();
        let mut updates = cache.subscribe();

        cache.append(Event {
            id: "a003".into(),
            title: "Retro".into(),
            start: "2024-01-03T09:00:00.000Z".into(),
            end: "2024-01-03T10:00:00.000Z".into(),
            all_day: false,
        });

        assert!(updates.has_changed().unwrap());
        let latest = updates.borrow_and_update().clone();
        assert_eq!(latest.last().map(|e| e.id.as_str()), Some("a003"));
        assert_eq!(cache.len(), 3);
        assert!(cache.contains("a003"));
        // append never touches the widget
        assert_eq!(widget.calls().len(), 1);
    }
}
