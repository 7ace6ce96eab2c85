//! [`RunManagerService`](crate::RunManagerService) errors.

use strand_runner_storage::StorageError;
use strand_runner_types::{JobSpecId, RunId, RunStatus};
use thiserror::Error;

/// Custom error type for the run manager core logic.
///
/// Terminal run failures (payment rejection, reorg, empty task list) are
/// not error variants: they are persisted on the run itself and surface
/// through `result.error_message`. These variants cover failures returned
/// to callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunnerError {
    /// A resume was invoked on a run whose status does not match the
    /// expected pending sub-state.
    #[error("run {id} is in state {status}, refusing to resume")]
    InvalidState {
        /// The run that rejected the resume.
        id: RunId,
        /// Its current status.
        status: RunStatus,
    },

    /// The triggering initiator kind is not declared by the job spec.
    #[error("job {0} does not declare the requested initiator")]
    UnknownInitiator(JobSpecId),

    /// Indicates that an error occurred while interacting with the
    /// storage layer.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Transient failure while fetching a transaction receipt. The run is
    /// left untouched and retried on the next tick.
    #[error("receipt lookup failed: {0}")]
    Receipt(String),
}
