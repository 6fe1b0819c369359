//! The server boundary: list, create and delete events in the remote store.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CalSyncResult;
use crate::event::{NewEvent, RemoteEventRecord};
use crate::remote::protocol::{CreateEvent, DeleteEvent, ListEvents};
use crate::remote::provider::{DEFAULT_PROVIDER_TIMEOUT, Provider};

/// The three operations the remote event store offers.
#[async_trait]
pub trait RemoteEventGateway: Send + Sync {
    /// All events in the store, in store order.
    async fn list(&self) -> CalSyncResult<Vec<RemoteEventRecord>>;

    /// Create an event and return the id the server assigned.
    async fn create(&self, event: &NewEvent) -> CalSyncResult<String>;

    async fn delete(&self, event_id: &str) -> CalSyncResult<()>;
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A remote event store reached through a provider binary.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
    #[serde(skip, default = "default_timeout")]
    timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_PROVIDER_TIMEOUT
}

impl Remote {
    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote {
            provider,
            config,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }
}

#[async_trait]
impl RemoteEventGateway for Remote {
    async fn list(&self) -> CalSyncResult<Vec<RemoteEventRecord>> {
        let records = self
            .provider
            .call(
                ListEvents {
                    remote_config: self.remote_config(),
                },
                self.timeout,
            )
            .await?;
        debug!(provider = self.provider.name(), count = records.len(), "listed events");
        Ok(records)
    }

    async fn create(&self, event: &NewEvent) -> CalSyncResult<String> {
        let id = self
            .provider
            .call(
                CreateEvent {
                    remote_config: self.remote_config(),
                    event: event.clone(),
                },
                self.timeout,
            )
            .await?;
        info!(provider = self.provider.name(), %id, "created event");
        Ok(id)
    }

    async fn delete(&self, event_id: &str) -> CalSyncResult<()> {
        self.provider
            .call(
                DeleteEvent {
                    remote_config: self.remote_config(),
                    event_id: event_id.to_string(),
                },
                self.timeout,
            )
            .await?;
        info!(provider = self.provider.name(), %event_id, "deleted event");
        Ok(())
    }
}
