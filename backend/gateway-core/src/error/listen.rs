use common::ErrorLocation;

use std::io::{Error as IoError, ErrorKind};

use thiserror::Error as ThisError;

/// Terminal outcome of a failed listen attempt.
#[derive(Debug, ThisError)]
pub enum ListenError {
    /// The endpoint stayed "address in use" through the whole retry budget.
    #[error("Lock Conflict Error: {message} {location}")]
    LockConflict {
        message: String,
        endpoint: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    /// Any other bind failure. Retrying cannot help.
    #[error("Bind Error: {message} {location}")]
    Bind {
        message: String,
        endpoint: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },
}

impl ListenError {
    pub fn is_lock_conflict(&self) -> bool {
        matches!(self, ListenError::LockConflict { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ListenError::LockConflict { message, .. } | ListenError::Bind { message, .. } => {
                message
            }
        }
    }

    /// The `ws://host:port` endpoint that could not be bound.
    pub fn endpoint(&self) -> &str {
        match self {
            ListenError::LockConflict { endpoint, .. } | ListenError::Bind { endpoint, .. } => {
                endpoint
            }
        }
    }

    /// Kind of the last OS error observed.
    pub fn io_kind(&self) -> ErrorKind {
        match self {
            ListenError::LockConflict { source, .. } | ListenError::Bind { source, .. } => {
                source.kind()
            }
        }
    }
}
