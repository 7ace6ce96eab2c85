use strand_runner_types::{JobSpecId, RunId};
use thiserror::Error;

/// Errors that may occur while interacting with runner storage.
///
/// This enum is used across all implementations of the storage traits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("lock poisoned")]
    LockPoisoned,

    /// The expected entry was not found in the store.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// A create collided with an existing record.
    #[error("conflicting data")]
    ConflictError,
}

/// Entry not found error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFoundError {
    /// Expected job run not found.
    #[error("job run not found: {0}")]
    JobRun(RunId),

    /// Expected job spec not found.
    #[error("job spec not found: {0}")]
    JobSpec(JobSpecId),
}
