//! Client error definitions.

use thiserror::Error;

use crate::transport::{Method, SendError};

/// Why one attempt did not yield a usable result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptFailure {
    #[error(transparent)]
    Send(#[from] SendError),

    /// The body parsed to JSON `null`.
    #[error("empty result")]
    EmptyResult,
}

impl AttemptFailure {
    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            AttemptFailure::Send(SendError::Transport { .. }) => "transport_error",
            AttemptFailure::Send(SendError::Parse { .. }) => "parse_error",
            AttemptFailure::EmptyResult => "empty_result",
        }
    }
}

/// Errors surfaced by the resilient client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Every attempt failed. Carries the last attempt's cause.
    #[error("failed to complete request: {method} {path} after {attempts} attempt(s): {last_cause}")]
    Exhausted {
        method: Method,
        path: String,
        attempts: u32,
        #[source]
        last_cause: AttemptFailure,
    },
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
