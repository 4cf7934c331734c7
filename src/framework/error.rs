//! # Controller Errors
//!
//! Only configuration problems and transport-level data failures cross an operation
//! boundary as `Err`. A create, update or delete that the data service *reports* as failed
//! is not an error here: it comes back as a [`TaskResult`](crate::framework::TaskResult)
//! with `ok == false`, and validation failures are plain state on the edit projection.

/// Failures reported by a [`DataService`](crate::framework::DataService) implementation.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Data store unavailable: {0}")]
    Unavailable(String),
    #[error("Operation rejected: {0}")]
    Rejected(String),
}

/// Errors raised by the controllers and their actor host.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Data access failed: {0}")]
    Data(#[from] DataError),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Controller closed")]
    ActorClosed,
    #[error("Controller dropped response channel")]
    ActorDropped,
    #[error("Controller task failed: {0}")]
    TaskFailed(String),
}
