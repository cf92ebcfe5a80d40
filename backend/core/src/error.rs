use std::time::Duration;

use thiserror::Error;

use crate::types::CallStatus;

/// Fallback message when the server rejects a dispatch without a body.
pub const DEFAULT_DISPATCH_FAILURE: &str = "Failed to dispatch agent.";

/// Input problems caught before anything goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("phone number is required")]
    MissingPhoneNumber,

    #[error("server URL is required")]
    MissingServerUrl,

    #[error("a call is already in progress (status: {0})")]
    NotIdle(CallStatus),
}

/// The dispatch server could not be reached or refused the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Non-2xx reply. Displays only the server's message.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("dispatch timed out after {0:?}")]
    Timeout(Duration),
}

impl DispatchError {
    /// Build a rejection from a status code and the raw response body.
    pub fn rejected(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            DEFAULT_DISPATCH_FAILURE.to_string()
        } else {
            body.to_string()
        };
        DispatchError::Rejected { status, message }
    }
}

/// Top-level error type for the dialer.
#[derive(Debug, Error)]
pub enum DialerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
