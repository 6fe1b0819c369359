//! JSON file holding every event, in creation order.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use calsync_core::RemoteEventRecord;
use fs2::FileExt;
use serde::Deserialize;

const EVENTS_FILE: &str = "events.json";

/// Remote config keys this provider understands.
#[derive(Debug, Default, Deserialize)]
pub struct StoreParams {
    pub local_path: Option<String>,
}

pub struct EventStore {
    path: PathBuf,
}

/// Exclusive hold on the store. Released when dropped.
pub struct StoreLock {
    _file: File,
}

impl EventStore {
    pub fn open(params: &StoreParams) -> Result<Self> {
        let path = match &params.local_path {
            Some(p) => expand_home(p),
            None => dirs::data_dir()
                .ok_or_else(|| anyhow!("Could not determine data directory"))?
                .join("calsync")
                .join(EVENTS_FILE),
        };
        Ok(Self::at(path))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        EventStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until no other provider process is changing this store.
    /// Hold the returned lock across a load/save pair.
    pub fn lock(&self) -> Result<StoreLock> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let lock_path = self.path.with_extension("json.lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open {}", lock_path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", lock_path.display()))?;
        Ok(StoreLock { _file: file })
    }

    /// All stored events. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<RemoteEventRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    pub fn save(&self, records: &[RemoteEventRecord]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        // Write to a temp file first so a crash never leaves half a file behind
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, serde_json::to_string_pretty(records)?)?;
        std::fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
