//! The run manager: thin orchestration of admission, resumes, and queue
//! hand-off.

use crate::{
    ChainInclusion, Clock, Config, QueueDispatcher, ReceiptProvider, ReorgValidator, RunPersistor,
    RunQueue, RunnerError,
    metrics::Metrics,
    payment,
    transition::{self, Outcome, Stimulus},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use strand_runner_storage::RunnerStore;
use strand_runner_types::{
    BridgeResponse, InitiatorKind, JobRun, JobSpec, JobSpecId, RunId, RunRequest, RunStatus,
    TaskRun,
};
use tracing::{debug, info, warn};

/// Defines the service surface of the run manager.
#[async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait RunManagerService: Debug + Send + Sync {
    /// Admits a new run of `job_spec_id` triggered by `initiator`.
    ///
    /// The run is persisted in every case; a run failing the payment
    /// check comes back `Errored` with the rejection recorded on its
    /// result rather than as an error.
    async fn create(
        &self,
        job_spec_id: &JobSpecId,
        initiator: InitiatorKind,
        data: serde_json::Value,
        creation_height: Option<u64>,
        request: RunRequest,
    ) -> Result<JobRun, RunnerError>;

    /// Applies a bridge callback to a run waiting on `PendingBridge`.
    ///
    /// Unlike the bulk paths this surfaces [`RunnerError::InvalidState`]
    /// to the caller, who owns the callback and must fix or drop it.
    async fn resume_pending(&self, id: &RunId, response: BridgeResponse)
    -> Result<(), RunnerError>;

    /// Advances every run waiting on confirmations (or a connection) to
    /// the observed `height`. Per-run failures are absorbed.
    async fn resume_all_confirming(&self, height: Option<u64>) -> Result<(), RunnerError>;

    /// Advances every run waiting on a node connection. Per-run failures
    /// are absorbed.
    async fn resume_all_connecting(&self) -> Result<(), RunnerError>;

    /// Re-delivers every executable run (including archived ones) to the
    /// worker queue. The executor bootstrap path.
    async fn resume_all_in_progress(&self) -> Result<(), RunnerError>;

    /// Cancels a run unless it already reached a terminal status.
    async fn cancel(&self, id: &RunId) -> Result<JobRun, RunnerError>;
}

/// The core run manager component.
///
/// Orchestrates the payment validator, reorg validator, transitioner,
/// persistor, and queue dispatcher; no business logic beyond sequencing
/// lives here.
#[derive(Debug)]
pub struct RunManager<S, P, Q> {
    config: Arc<Config>,
    store: Arc<S>,
    persistor: RunPersistor<S>,
    reorg: ReorgValidator<P>,
    dispatcher: QueueDispatcher<Q>,
    clock: Arc<dyn Clock>,
}

impl<S, P, Q> RunManager<S, P, Q>
where
    S: RunnerStore + Send + Sync,
    P: ReceiptProvider,
    Q: RunQueue,
{
    /// Creates a new [`RunManager`] instance.
    pub fn new(
        config: Config,
        store: Arc<S>,
        provider: Arc<P>,
        queue: Arc<Q>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            persistor: RunPersistor::new(Arc::clone(&store)),
            reorg: ReorgValidator::new(provider),
            dispatcher: QueueDispatcher::new(queue),
            store,
            clock,
        }
    }

    /// Initializes the runner metrics.
    pub fn with_metrics(self) -> Self {
        Metrics::init();
        self
    }

    /// Materializes task runs from the job spec, freezing parameters
    /// per-run and resolving each task's confirmation floor from the task
    /// spec, the bridge registry, and the configured minimum.
    fn materialize_task_runs(
        &self,
        run: &JobRun,
        spec: &JobSpec,
    ) -> Result<Vec<TaskRun>, RunnerError> {
        let mut task_runs = Vec::with_capacity(spec.tasks.len());
        for task_spec in &spec.tasks {
            let mut task = TaskRun::new(run.id, task_spec.clone());
            let mut minimum = self
                .config
                .min_incoming_confirmations
                .max(task_spec.confirmations.unwrap_or(0));
            if let Some(bridge) = self.store.find_bridge(&task_spec.task_type)? {
                minimum = minimum.max(bridge.confirmations);
            }
            task.minimum_confirmations = (minimum > 0).then_some(minimum);
            task_runs.push(task);
        }
        Ok(task_runs)
    }

    async fn resume_confirming(
        &self,
        run: &JobRun,
        height: Option<u64>,
    ) -> Result<(), RunnerError> {
        let now = self.clock.now();

        // Only consult the chain when this tick can complete the wait;
        // the transitioner ignores the verdict otherwise.
        let inclusion = match height {
            Some(height) if confirmations_met_at(run, height) => self.reorg.verify(run).await?,
            _ => ChainInclusion::Unknown,
        };

        let stimulus = Stimulus::BlockTick { height, inclusion };
        let (updated, outcome) =
            self.persistor.advance(&run.id, |run| transition::transition(run, &stimulus, now))?;
        Metrics::record_resumed(Metrics::PATH_CONFIRMING);
        if outcome == Outcome::Runnable {
            self.dispatcher.dispatch(&updated.id).await;
        }
        Ok(())
    }
}

/// Whether the head task's confirmation target would be met at `height`.
fn confirmations_met_at(run: &JobRun, height: u64) -> bool {
    let Some(task) = run.head_task() else {
        return false;
    };
    let target = task.minimum_confirmations.unwrap_or(0);
    let creation_height = run.creation_height.unwrap_or(height);
    transition::observed_confirmations(creation_height, height, target) >= target
}

#[async_trait]
impl<S, P, Q> RunManagerService for RunManager<S, P, Q>
where
    S: RunnerStore + Send + Sync,
    P: ReceiptProvider,
    Q: RunQueue,
{
    async fn create(
        &self,
        job_spec_id: &JobSpecId,
        initiator: InitiatorKind,
        data: serde_json::Value,
        creation_height: Option<u64>,
        request: RunRequest,
    ) -> Result<JobRun, RunnerError> {
        let spec = self.store.find_job_spec(job_spec_id)?;
        if !spec.has_initiator(initiator) {
            return Err(RunnerError::UnknownInitiator(*job_spec_id));
        }
        let now = self.clock.now();

        let mut run = JobRun::new(*job_spec_id, request);
        run.creation_height = creation_height;
        run.observed_height = creation_height;
        run.overrides = data;
        run.task_runs = self.materialize_task_runs(&run, &spec)?;

        let cost = payment::contract_cost(&self.config, &spec, self.store.as_ref())?;
        payment::validate_run(&mut run, &cost, now);
        if run.status == RunStatus::Errored {
            self.store.create_job_run(&run)?;
            Metrics::record_created(false);
            warn!(
                target: "runner::manager",
                id = %run.id,
                job = %job_spec_id,
                "Rejected run below payment threshold"
            );
            return Ok(run);
        }

        let wants_confirmations = creation_height.is_some() &&
            run.task_runs
                .first()
                .is_some_and(|task| task.minimum_confirmations.unwrap_or(0) > 0);
        if wants_confirmations {
            run.status = RunStatus::PendingConfirmations;
            if let Some(task) = run.head_task_mut() {
                task.status = RunStatus::PendingConfirmations;
            }
        } else {
            run.status = RunStatus::InProgress;
        }

        self.store.create_job_run(&run)?;
        Metrics::record_created(true);
        info!(
            target: "runner::manager",
            id = %run.id,
            job = %job_spec_id,
            status = %run.status,
            "Created job run"
        );
        if run.status.is_runnable() {
            self.dispatcher.dispatch(&run.id).await;
        }
        Ok(run)
    }

    async fn resume_pending(
        &self,
        id: &RunId,
        response: BridgeResponse,
    ) -> Result<(), RunnerError> {
        let now = self.clock.now();
        let stimulus = Stimulus::BridgeReply(response);
        let (run, outcome) =
            self.persistor.advance(id, |run| transition::transition(run, &stimulus, now))?;
        Metrics::record_resumed(Metrics::PATH_PENDING);
        if outcome == Outcome::Runnable {
            self.dispatcher.dispatch(&run.id).await;
        }
        Ok(())
    }

    async fn resume_all_confirming(&self, height: Option<u64>) -> Result<(), RunnerError> {
        let candidates = self.store.job_runs_with_status(&[
            RunStatus::PendingConfirmations,
            RunStatus::PendingConnection,
        ])?;
        debug!(
            target: "runner::manager",
            count = candidates.len(),
            ?height,
            "Resuming confirming runs"
        );
        for candidate in candidates {
            if let Err(err) = self.resume_confirming(&candidate, height).await {
                Metrics::record_resume_error(Metrics::PATH_CONFIRMING);
                warn!(
                    target: "runner::manager",
                    id = %candidate.id,
                    %err,
                    "Failed to resume confirming run"
                );
            }
        }
        Ok(())
    }

    async fn resume_all_connecting(&self) -> Result<(), RunnerError> {
        let candidates = self.store.job_runs_with_status(&[RunStatus::PendingConnection])?;
        debug!(target: "runner::manager", count = candidates.len(), "Resuming connecting runs");
        let now = self.clock.now();
        for candidate in candidates {
            let result = self.persistor.advance(&candidate.id, |run| {
                transition::transition(run, &Stimulus::ConnectionRestored, now)
            });
            match result {
                Ok((run, Outcome::Runnable)) => {
                    Metrics::record_resumed(Metrics::PATH_CONNECTING);
                    self.dispatcher.dispatch(&run.id).await;
                }
                Ok(_) => Metrics::record_resumed(Metrics::PATH_CONNECTING),
                Err(err) => {
                    Metrics::record_resume_error(Metrics::PATH_CONNECTING);
                    warn!(
                        target: "runner::manager",
                        id = %candidate.id,
                        %err,
                        "Failed to resume connecting run"
                    );
                }
            }
        }
        Ok(())
    }

    async fn resume_all_in_progress(&self) -> Result<(), RunnerError> {
        let runs = self.store.executable_job_runs()?;
        debug!(target: "runner::manager", count = runs.len(), "Re-delivering executable runs");
        for run in runs {
            Metrics::record_resumed(Metrics::PATH_IN_PROGRESS);
            self.dispatcher.dispatch(&run.id).await;
        }
        Ok(())
    }

    async fn cancel(&self, id: &RunId) -> Result<JobRun, RunnerError> {
        let now = self.clock.now();
        let (run, outcome) = self
            .persistor
            .advance(id, |run| transition::transition(run, &Stimulus::Cancellation, now))?;
        if outcome == Outcome::Updated {
            info!(target: "runner::manager", %id, "Cancelled job run");
        }
        Ok(run)
    }
}
