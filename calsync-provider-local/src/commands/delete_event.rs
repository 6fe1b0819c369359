use anyhow::{Result, bail};
use serde::Deserialize;

use crate::store::{EventStore, StoreParams};

#[derive(Debug, Deserialize)]
struct DeleteEventParams {
    #[serde(flatten)]
    store: StoreParams,
    event_id: String,
}

pub async fn handle(params: &serde_json::Value) -> Result<serde_json::Value> {
    let params: DeleteEventParams = serde_json::from_value(params.clone())?;
    let event_id = params.event_id;

    let store = EventStore::open(&params.store)?;
    let _lock = store.lock()?;
    let mut records = store.load()?;

    let before = records.len();
    records.retain(|r| r.id != event_id);
    if records.len() == before {
        bail!("Event not found: {}", event_id);
    }
    store.save(&records)?;

    tracing::info!(%event_id, "deleted event");
    Ok(serde_json::Value::Null)
}
