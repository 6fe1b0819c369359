use anyhow::{Result, bail};
use calsync_core::{NewEvent, RemoteEventRecord};
use serde::Deserialize;

use crate::store::{EventStore, StoreParams};

#[derive(Debug, Deserialize)]
struct CreateEventParams {
    #[serde(flatten)]
    store: StoreParams,
    event: NewEvent,
}

pub async fn handle(params: &serde_json::Value) -> Result<serde_json::Value> {
    let params: CreateEventParams = serde_json::from_value(params.clone())?;
    let event = params.event;

    if event.title.trim().is_empty() {
        bail!("Event title is required");
    }

    let store = EventStore::open(&params.store)?;
    let _lock = store.lock()?;
    let mut records = store.load()?;

    let id = uuid::Uuid::new_v4().simple().to_string();
    records.push(RemoteEventRecord {
        id: id.clone(),
        subject: Some(event.title),
        start_date_time: Some(event.start),
        end_date_time: Some(event.end),
        is_all_day_event: Some(false),
    });
    store.save(&records)?;

    tracing::info!(%id, path = %store.path().display(), "created event");
    Ok(serde_json::Value::String(id))
}
