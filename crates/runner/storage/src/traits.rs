use crate::StorageError;
use std::fmt::Debug;
use strand_runner_types::{BridgeType, JobRun, JobSpec, JobSpecId, RunId, RunStatus, TaskType};

/// Read access to persisted job runs.
///
/// Implementations are expected to provide durable, thread-safe access to
/// run records.
pub trait JobRunStorageReader: Debug {
    /// Loads the run with the given id.
    ///
    /// # Returns
    /// * `Ok(JobRun)` if the run exists.
    /// * `Err(StorageError::NotFound)` otherwise.
    fn find_job_run(&self, id: &RunId) -> Result<JobRun, StorageError>;

    /// Returns every non-archived run whose status is one of `statuses`.
    ///
    /// Used by the bulk resume paths to select candidates. Soft-deleted
    /// runs are excluded: an archived run only progresses if it was
    /// already runnable when archived.
    fn job_runs_with_status(&self, statuses: &[RunStatus]) -> Result<Vec<JobRun>, StorageError>;

    /// Returns every run in a runnable status (`InProgress` or
    /// `PendingSleep`), **including** soft-deleted ones.
    ///
    /// This is the executor bootstrap selection: archived runs that were
    /// already executable have been paid for and must still complete.
    fn executable_job_runs(&self) -> Result<Vec<JobRun>, StorageError>;
}

/// Write access to persisted job runs.
pub trait JobRunStorageWriter: Debug {
    /// Persists a newly created run.
    ///
    /// # Returns
    /// * `Err(StorageError::ConflictError)` if a run with the same id
    ///   already exists.
    fn create_job_run(&self, run: &JobRun) -> Result<(), StorageError>;

    /// Replaces the stored record of an existing run.
    ///
    /// The replacement is atomic: readers observe either the previous
    /// record or the new one in full.
    fn save_job_run(&self, run: &JobRun) -> Result<(), StorageError>;
}

/// Combines both reading and writing capabilities for job run storage.
///
/// Any type that implements both [`JobRunStorageReader`] and
/// [`JobRunStorageWriter`] automatically implements this trait.
pub trait JobRunStorage: JobRunStorageReader + JobRunStorageWriter {}

impl<T: JobRunStorageReader + JobRunStorageWriter> JobRunStorage for T {}

/// Read access to job specifications.
pub trait JobSpecStorageReader: Debug {
    /// Loads the job spec with the given id.
    fn find_job_spec(&self, id: &JobSpecId) -> Result<JobSpec, StorageError>;
}

/// Read access to the bridge registry.
pub trait BridgeStorageReader: Debug {
    /// Looks up the bridge registered under the given task type.
    ///
    /// Returns `Ok(None)` for task types that are not bridges; the
    /// caller treats those as contributing nothing to the payment floor.
    fn find_bridge(&self, task_type: &TaskType) -> Result<Option<BridgeType>, StorageError>;
}

/// The full storage surface the run manager operates against.
///
/// Any type that implements the run, spec, and bridge traits
/// automatically implements this trait.
pub trait RunnerStore: JobRunStorage + JobSpecStorageReader + BridgeStorageReader {}

impl<T: JobRunStorage + JobSpecStorageReader + BridgeStorageReader> RunnerStore for T {}
