use anyhow::Result;

use crate::store::{EventStore, StoreParams};

pub async fn handle(params: &serde_json::Value) -> Result<serde_json::Value> {
    let params: StoreParams = serde_json::from_value(params.clone())?;
    let records = EventStore::open(&params)?.load()?;

    tracing::debug!(count = records.len(), "listing events");
    Ok(serde_json::to_value(records)?)
}
