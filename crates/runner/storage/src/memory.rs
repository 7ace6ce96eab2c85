use crate::{
    BridgeStorageReader, JobRunStorageReader, JobRunStorageWriter, JobSpecStorageReader,
    NotFoundError, StorageError,
};
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use strand_runner_types::{BridgeType, JobRun, JobSpec, JobSpecId, RunId, RunStatus, TaskType};
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    runs: HashMap<RunId, JobRun>,
    specs: HashMap<JobSpecId, JobSpec>,
    bridges: HashMap<TaskType, BridgeType>,
}

/// In-memory reference store.
///
/// Backs tests and single-process deployments. Saving a run swaps the
/// whole record under the write lock, which is what gives the runner its
/// atomic-visibility contract; a relational backend maps the same contract
/// onto a transaction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job spec.
    pub fn insert_job_spec(&self, spec: JobSpec) -> Result<(), StorageError> {
        self.write()?.specs.insert(spec.id, spec);
        Ok(())
    }

    /// Registers a bridge under its task type name.
    pub fn insert_bridge(&self, bridge: BridgeType) -> Result<(), StorageError> {
        self.write()?.bridges.insert(bridge.name.clone(), bridge);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StorageError> {
        self.inner.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StorageError> {
        self.inner.write().map_err(|_| StorageError::LockPoisoned)
    }
}

impl JobRunStorageReader for MemoryStore {
    fn find_job_run(&self, id: &RunId) -> Result<JobRun, StorageError> {
        self.read()?.runs.get(id).cloned().ok_or_else(|| NotFoundError::JobRun(*id).into())
    }

    fn job_runs_with_status(&self, statuses: &[RunStatus]) -> Result<Vec<JobRun>, StorageError> {
        Ok(self
            .read()?
            .runs
            .values()
            .filter(|run| !run.is_archived() && statuses.contains(&run.status))
            .cloned()
            .collect())
    }

    fn executable_job_runs(&self) -> Result<Vec<JobRun>, StorageError> {
        Ok(self.read()?.runs.values().filter(|run| run.status.is_runnable()).cloned().collect())
    }
}

impl JobRunStorageWriter for MemoryStore {
    fn create_job_run(&self, run: &JobRun) -> Result<(), StorageError> {
        let mut inner = self.write()?;
        if inner.runs.contains_key(&run.id) {
            return Err(StorageError::ConflictError);
        }
        debug!(target: "runner::storage", id = %run.id, status = %run.status, "Created job run");
        inner.runs.insert(run.id, run.clone());
        Ok(())
    }

    fn save_job_run(&self, run: &JobRun) -> Result<(), StorageError> {
        let mut inner = self.write()?;
        if !inner.runs.contains_key(&run.id) {
            return Err(NotFoundError::JobRun(run.id).into());
        }
        inner.runs.insert(run.id, run.clone());
        Ok(())
    }
}

impl JobSpecStorageReader for MemoryStore {
    fn find_job_spec(&self, id: &JobSpecId) -> Result<JobSpec, StorageError> {
        self.read()?.specs.get(id).cloned().ok_or_else(|| NotFoundError::JobSpec(*id).into())
    }
}

impl BridgeStorageReader for MemoryStore {
    fn find_bridge(&self, task_type: &TaskType) -> Result<Option<BridgeType>, StorageError> {
        Ok(self.read()?.bridges.get(task_type).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_runner_types::RunRequest;

    fn new_run(status: RunStatus) -> JobRun {
        let mut run = JobRun::new(JobSpecId::random(), RunRequest::new());
        run.status = status;
        run
    }

    #[test]
    fn create_then_find_round_trips() {
        let store = MemoryStore::new();
        let run = new_run(RunStatus::InProgress);
        store.create_job_run(&run).unwrap();
        assert_eq!(store.find_job_run(&run.id).unwrap(), run);
    }

    #[test]
    fn create_twice_conflicts() {
        let store = MemoryStore::new();
        let run = new_run(RunStatus::InProgress);
        store.create_job_run(&run).unwrap();
        assert_eq!(store.create_job_run(&run), Err(StorageError::ConflictError));
    }

    #[test]
    fn save_requires_existing_run() {
        let store = MemoryStore::new();
        let run = new_run(RunStatus::InProgress);
        assert!(matches!(store.save_job_run(&run), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn status_selection_skips_archived() {
        let store = MemoryStore::new();
        let mut archived = new_run(RunStatus::PendingConfirmations);
        archived.deleted_at = Some(1);
        let live = new_run(RunStatus::PendingConfirmations);
        store.create_job_run(&archived).unwrap();
        store.create_job_run(&live).unwrap();

        let selected = store
            .job_runs_with_status(&[RunStatus::PendingConfirmations])
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, live.id);
    }

    #[test]
    fn executable_selection_includes_archived() {
        let store = MemoryStore::new();
        let mut archived = new_run(RunStatus::PendingSleep);
        archived.deleted_at = Some(1);
        let live = new_run(RunStatus::InProgress);
        let pending = new_run(RunStatus::PendingBridge);
        store.create_job_run(&archived).unwrap();
        store.create_job_run(&live).unwrap();
        store.create_job_run(&pending).unwrap();

        let mut ids: Vec<_> =
            store.executable_job_runs().unwrap().into_iter().map(|run| run.id).collect();
        ids.sort_by_key(|id| format!("{id}"));
        let mut expected = vec![archived.id, live.id];
        expected.sort_by_key(|id| format!("{id}"));
        assert_eq!(ids, expected);
    }

    #[test]
    fn bridge_lookup_misses_are_none() {
        let store = MemoryStore::new();
        assert_eq!(store.find_bridge(&TaskType::no_op()).unwrap(), None);
    }
}
