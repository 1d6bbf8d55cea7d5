use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors returned by the coordination controllers.
///
/// Validation, not-found and authorization failures are raised before any
/// write. A `Persistence` error may be raised after earlier writes of the
/// same operation already succeeded; those writes are not rolled back.
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("requester is not allowed to act on this event")]
    Unauthorized,

    /// The event no longer accepts guests.
    #[error("event has already finished")]
    EventFinished,

    #[error("persistence error: {0}")]
    Persistence(#[from] GatewayError),

    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CoordinationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoordinationError::Validation(msg.into())
    }
}
