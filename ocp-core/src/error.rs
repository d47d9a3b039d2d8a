//! Error types for OCP reconciliation.
//!
//! Every failure a reconciliation attempt can hit surfaces as exactly one
//! [`OcpError`]. The variants separate transport problems from backend
//! verdicts so callers can tell "the network broke" from "the backend gave up".

use std::time::Duration;
use thiserror::Error;

/// The main error type for OCP operations.
#[derive(Error, Debug)]
pub enum OcpError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// A resource that should exist could not be found.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Resource kind ("cluster", "node pool").
        kind: &'static str,
        /// Backend-assigned identifier.
        id: String,
    },

    /// The deadline passed while the operation was still in progress.
    #[error("operation {operation_id} did not finish within {}s", elapsed.as_secs())]
    OperationTimeout {
        /// The operation that was being awaited.
        operation_id: String,
        /// Time spent waiting before giving up.
        elapsed: Duration,
    },

    /// The backend reported the operation as failed.
    #[error("operation {operation_id} failed: {}", failure_reason(operation_type, step.as_deref()))]
    OperationFailed {
        /// The failed operation.
        operation_id: String,
        /// What kind of mutation the operation fulfilled.
        operation_type: String,
        /// Name of the step that was running when it failed, if known.
        step: Option<String>,
    },

    /// The backend reported the operation as aborted.
    #[error("operation {operation_id} aborted: {}", failure_reason(operation_type, step.as_deref()))]
    OperationAborted {
        /// The aborted operation.
        operation_id: String,
        /// What kind of mutation the operation fulfilled.
        operation_type: String,
        /// Name of the step that was running when it was aborted, if known.
        step: Option<String>,
    },

    /// A synchronous call sequence ran past its deadline.
    #[error("{action} did not finish within {}s", timeout.as_secs())]
    DeadlineExceeded {
        /// What was being done ("update cluster c-1").
        action: String,
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The wait was cancelled by the caller.
    #[error("waiting for operation {operation_id} was cancelled")]
    Cancelled {
        /// The operation whose wait was interrupted.
        operation_id: String,
    },

    /// The backend returned a payload that does not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Provider configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A declared resource violates a local rule before any call is made.
    #[error("validation failed: {0}")]
    Validation(String),
}

fn failure_reason(operation_type: &str, step: Option<&str>) -> String {
    match step {
        Some(step) => format!("{operation_type}, at the step: {step}"),
        None => format!("{operation_type}, failure step unavailable"),
    }
}

/// Result type for OCP operations.
pub type Result<T> = std::result::Result<T, OcpError>;

impl OcpError {
    /// Create a malformed-response error with the given message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create an invalid-configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True for failures the backend itself reported on an operation.
    pub fn is_operation_failure(&self) -> bool {
        matches!(
            self,
            Self::OperationFailed { .. } | Self::OperationAborted { .. }
        )
    }
}

impl From<serde_json::Error> for OcpError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
