//! Transactional load–apply–save wrapper around run storage.

use crate::{Outcome, RunnerError};
use derive_more::Constructor;
use std::sync::Arc;
use strand_runner_storage::JobRunStorage;
use strand_runner_types::{JobRun, RunId};
use tracing::trace;

/// Applies transition closures to stored runs.
///
/// Every mutation is: reload the run by id, apply the closure on the
/// in-memory record, save the result. The store's save is the transaction
/// boundary: the transition's full tuple becomes visible at once or not
/// at all. Transitions for a single run are serialized by the
/// single-writer execution model; across runs no ordering is promised.
#[derive(Debug, Constructor)]
pub struct RunPersistor<S> {
    store: Arc<S>,
}

impl<S: JobRunStorage> RunPersistor<S> {
    /// Loads the run with `id`, applies `apply`, and saves the result
    /// unless the closure reports [`Outcome::Unchanged`].
    ///
    /// Closure errors abort the mutation without saving.
    pub fn advance<F>(&self, id: &RunId, apply: F) -> Result<(JobRun, Outcome), RunnerError>
    where
        F: FnOnce(&mut JobRun) -> Result<Outcome, RunnerError>,
    {
        let mut run = self.store.find_job_run(id)?;
        let outcome = apply(&mut run)?;
        if outcome != Outcome::Unchanged {
            self.store.save_job_run(&run)?;
            trace!(target: "runner::persistor", %id, status = %run.status, "Persisted transition");
        }
        Ok((run, outcome))
    }
}

impl<S> Clone for RunPersistor<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_runner_storage::{JobRunStorageReader, JobRunStorageWriter, MemoryStore};
    use strand_runner_types::{JobSpecId, RunRequest, RunStatus};

    fn stored_run(store: &MemoryStore) -> JobRun {
        let run = JobRun::new(JobSpecId::random(), RunRequest::new());
        store.create_job_run(&run).unwrap();
        run
    }

    #[test]
    fn advance_persists_updates() {
        let store = Arc::new(MemoryStore::new());
        let run = stored_run(&store);
        let persistor = RunPersistor::new(Arc::clone(&store));

        let (updated, outcome) = persistor
            .advance(&run.id, |run| {
                run.status = RunStatus::InProgress;
                Ok(Outcome::Runnable)
            })
            .unwrap();

        assert_eq!(outcome, Outcome::Runnable);
        assert_eq!(updated.status, RunStatus::InProgress);
        assert_eq!(store.find_job_run(&run.id).unwrap().status, RunStatus::InProgress);
    }

    #[test]
    fn advance_skips_save_when_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let run = stored_run(&store);
        let persistor = RunPersistor::new(Arc::clone(&store));

        let (_, outcome) = persistor
            .advance(&run.id, |run| {
                // A no-op arm must not dirty the record even if the
                // closure scribbled on the in-memory copy.
                run.status = RunStatus::Cancelled;
                Ok(Outcome::Unchanged)
            })
            .unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(store.find_job_run(&run.id).unwrap().status, RunStatus::Unstarted);
    }

    #[test]
    fn advance_aborts_on_closure_error() {
        let store = Arc::new(MemoryStore::new());
        let run = stored_run(&store);
        let persistor = RunPersistor::new(Arc::clone(&store));

        let err = persistor
            .advance(&run.id, |run| {
                run.status = RunStatus::Errored;
                Err(RunnerError::InvalidState { id: run.id, status: RunStatus::Unstarted })
            })
            .unwrap_err();

        assert!(matches!(err, RunnerError::InvalidState { .. }));
        assert_eq!(store.find_job_run(&run.id).unwrap().status, RunStatus::Unstarted);
    }

    #[test]
    fn advance_surfaces_missing_runs() {
        let store = Arc::new(MemoryStore::new());
        let persistor = RunPersistor::new(store);

        let err = persistor.advance(&RunId::random(), |_| Ok(Outcome::Updated)).unwrap_err();
        assert!(matches!(err, RunnerError::Storage(_)));
    }
}
