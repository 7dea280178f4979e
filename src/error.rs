//! Error types for the pilum library.
//!
//! All failures surface as the [`PilumError`] enum. Failures reported by the
//! underlying index resource are translated into [`PilumError::IndexIo`] at
//! the writer boundary, tagged with the [`EventContext`] of the operation
//! that caused them; the resource's native error type never leaks past the
//! delegator.

use std::time::Duration;

use thiserror::Error;

use crate::reporting::EventContext;

/// The main error type for pilum operations.
#[derive(Error, Debug)]
pub enum PilumError {
    /// The underlying index resource rejected an operation.
    #[error("index I/O error: {message} [{context}]")]
    IndexIo {
        message: String,
        context: EventContext,
    },

    /// Work was submitted to an index whose orchestrator is closed, either
    /// after shutdown or after an unrecoverable prior failure.
    #[error("orchestrator closed: {message} [{context}]")]
    OrchestratorClosed {
        message: String,
        context: EventContext,
    },

    /// A drain-and-close wait ran out of time before pending work completed.
    #[error("drain timed out after {timeout:?} [{context}]")]
    DrainTimeout {
        timeout: Duration,
        context: EventContext,
    },

    /// Work cancelled before it started executing.
    #[error("operation cancelled: {0}")]
    OperationCancelled(String),

    /// Work rejected at the submission boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for operations that may fail with [`PilumError`].
pub type Result<T> = std::result::Result<T, PilumError>;

impl PilumError {
    /// Create a new index I/O error tagged with the call-site context.
    pub fn index_io<S: Into<String>>(message: S, context: &EventContext) -> Self {
        PilumError::IndexIo {
            message: message.into(),
            context: context.clone(),
        }
    }

    /// Create a new orchestrator-closed error.
    pub fn orchestrator_closed<S: Into<String>>(message: S, context: &EventContext) -> Self {
        PilumError::OrchestratorClosed {
            message: message.into(),
            context: context.clone(),
        }
    }

    /// Create a new drain-timeout error.
    pub fn drain_timeout(timeout: Duration, context: &EventContext) -> Self {
        PilumError::DrainTimeout {
            timeout,
            context: context.clone(),
        }
    }

    /// Create a new cancellation error.
    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        PilumError::OperationCancelled(message.into())
    }

    /// Create a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        PilumError::Validation(message.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        PilumError::Internal(message.into())
    }

    /// The event context attached to this error, if any.
    pub fn context(&self) -> Option<&EventContext> {
        match self {
            PilumError::IndexIo { context, .. }
            | PilumError::OrchestratorClosed { context, .. }
            | PilumError::DrainTimeout { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The message of this error without its context suffix, used when the
    /// same root cause is fanned out to several work items.
    pub fn root_message(&self) -> String {
        match self {
            PilumError::IndexIo { message, .. }
            | PilumError::OrchestratorClosed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
