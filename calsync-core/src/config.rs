//! calsync configuration, read from ~/.config/calsync/config.toml
//!
//! ```toml
//! timeout_secs = 10
//!
//! [remote]
//! provider = "local"
//! local_path = "~/calendar/events.json"
//!
//! [messages]
//! created_title = "Success!!"
//!
//! [calendar]
//! default_view = "agendaWeek"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CalSyncError, CalSyncResult};
use crate::remote::Remote;
use crate::remote::provider::DEFAULT_PROVIDER_TIMEOUT;

fn default_timeout_secs() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Where events are listed from and saved to
    pub remote: Option<Remote>,

    /// Upper bound on a single provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub messages: Messages,

    #[serde(default)]
    pub calendar: CalendarOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            remote: None,
            timeout_secs: default_timeout_secs(),
            messages: Messages::default(),
            calendar: CalendarOptions::default(),
        }
    }
}

impl SyncConfig {
    pub fn config_path() -> CalSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalSyncError::Config("Could not determine config directory".into()))?
            .join("calsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> CalSyncResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> CalSyncResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> CalSyncResult<Self> {
        toml::from_str(content).map_err(|e| CalSyncError::Config(e.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured remote, with the configured timeout applied.
    pub fn remote(&self) -> CalSyncResult<Remote> {
        let remote = self
            .remote
            .clone()
            .ok_or_else(|| CalSyncError::Config("No remote configured".into()))?;
        Ok(remote.with_timeout(self.timeout()))
    }
}

/// Texts of the toasts shown after a save or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub created_title: String,
    pub created_message: String,
    pub error_title: String,
    pub create_failed_message: String,
    pub delete_failed_message: String,
    pub busy_message: String,
}

impl Default for Messages {
    fn default() -> Self {
        Messages {
            created_title: "Success!!".into(),
            created_message: "Your event has been logged".into(),
            error_title: "Oops".into(),
            create_failed_message: "Something went wrong, please review console".into(),
            delete_failed_message: "The event could not be deleted".into(),
            busy_message: "Please wait until the previous change has been saved".into(),
        }
    }
}

/// Display options handed to the widget when it is mounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    /// "month", "agendaWeek" or "agendaDay"
    pub default_view: String,
    /// Allow selecting a time range (which opens the form)
    pub selectable: bool,
    /// Day and week names link to their views
    pub nav_links: bool,
    /// Collapse busy days into a "more" link
    pub event_limit: bool,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        CalendarOptions {
            default_view: "agendaWeek".into(),
            selectable: true,
            nav_links: true,
            event_limit: true,
        }
    }
}
