use std::fmt;

use thiserror::Error;

use crate::{remote::RemoteError, transcoder::TranscodeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOperation::Create => "create",
            WriteOperation::Update => "update",
            WriteOperation::Delete => "delete",
        })
    }
}

/// Failures of the synchronization operations.
///
/// Fetch failures are only ever recorded into the store; the other variants are
/// both recorded and returned to the caller.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(RemoteError),
    #[error("failed to {operation} appointment: {source}")]
    RemoteWrite {
        operation: WriteOperation,
        #[source]
        source: RemoteError,
    },
    #[error("failed to {operation} appointment: {source}")]
    Encode {
        operation: WriteOperation,
        #[source]
        source: TranscodeError,
    },
    #[error("invalid appointment: {0}")]
    Validation(String),
}

impl SyncError {
    pub fn is_remote_write(&self) -> bool {
        matches!(self, SyncError::RemoteWrite { .. })
    }
}
