//! Error types for calsync.

use thiserror::Error;

/// Errors that can occur while syncing the calendar with its remote store.
#[derive(Error, Debug)]
pub enum CalSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The list call returned nothing usable. Never fatal: the cache is
    /// emptied and the empty state is shown.
    #[error("No events are found")]
    NoEventsFound,

    #[error("Invalid event: {0}")]
    Validation(String),

    /// Another save or delete is still waiting on the server.
    #[error("Another change is still in progress")]
    Busy,

    #[error("The event form is not open")]
    FormClosed,

    #[error("Event not found: {0}")]
    EventNotFound(String),
}

/// Result type alias for calsync operations.
pub type CalSyncResult<T> = Result<T, CalSyncError>;
