//! Error types for the eventdir ecosystem.

use thiserror::Error;

/// Errors that can occur in eventdir operations.
///
/// Date parse failures are deliberately absent: an unparseable date is
/// routed to the undated bucket instead of failing the caller.
#[derive(Error, Debug)]
pub enum EventDirError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Record store error: {0}")]
    Store(String),

    #[error("Record store returned status {status} for '{collection}'")]
    StoreStatus { collection: String, status: u16 },

    #[error("Record store request timed out after {0}s")]
    StoreTimeout(u64),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("ICS export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for eventdir operations.
pub type EventDirResult<T> = Result<T, EventDirError>;
