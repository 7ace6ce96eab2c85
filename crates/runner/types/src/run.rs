//! Job runs and their per-step task runs.

use crate::{JobSpecId, RunId, RunRequest, RunStatus, TaskId, TaskSpec};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Structured outcome attached to a run or a task run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Result data produced so far.
    pub data: serde_json::Value,
    /// Failure reason, set when the owning run or task errored.
    pub error_message: Option<String>,
}

impl RunResult {
    /// Merges incoming result data into this result.
    ///
    /// Object values merge key-wise with incoming keys winning; any other
    /// non-null incoming value replaces the existing data wholesale.
    pub fn merge_data(&mut self, incoming: &serde_json::Value) {
        match (&mut self.data, incoming) {
            (serde_json::Value::Object(existing), serde_json::Value::Object(incoming)) => {
                for (key, value) in incoming {
                    existing.insert(key.clone(), value.clone());
                }
            }
            (_, serde_json::Value::Null) => {}
            (slot, incoming) => *slot = incoming.clone(),
        }
    }
}

/// A single step of a job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRun {
    /// Unique identifier of this task run.
    pub id: TaskId,
    /// The run this task belongs to.
    pub job_run_id: RunId,
    /// The materialized task spec, parameters frozen at creation.
    pub task_spec: TaskSpec,
    /// Current status of this step.
    pub status: RunStatus,
    /// Required block confirmations before this step may execute.
    pub minimum_confirmations: Option<u32>,
    /// Observed confirmations, capped at `minimum_confirmations`.
    pub confirmations: Option<u32>,
    /// Step-level outcome.
    pub result: RunResult,
}

impl TaskRun {
    /// Materializes a task run for `job_run_id` from a task spec.
    pub fn new(job_run_id: RunId, task_spec: TaskSpec) -> Self {
        Self {
            id: TaskId::random(),
            job_run_id,
            task_spec,
            status: RunStatus::Unstarted,
            minimum_confirmations: None,
            confirmations: None,
            result: RunResult::default(),
        }
    }

    /// Whether this step still needs block confirmations it has not
    /// observed yet.
    pub fn confirmations_outstanding(&self) -> bool {
        let target = self.minimum_confirmations.unwrap_or(0);
        target > 0 && self.confirmations.unwrap_or(0) < target
    }
}

/// A runtime instance of a job spec.
///
/// Runs are mutated only through the persistor; `payment` and the
/// materialized task parameters are immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRun {
    /// Unique identifier, assigned at creation.
    pub id: RunId,
    /// The owning job specification.
    pub job_spec_id: JobSpecId,
    /// Current status of the run.
    pub status: RunStatus,
    /// Token amount offered with the request.
    pub payment: Option<U256>,
    /// Block height the initiating log was observed at.
    pub creation_height: Option<u64>,
    /// Most recent block height the run was evaluated against.
    pub observed_height: Option<u64>,
    /// Set exactly when the run enters a terminal status.
    pub finished_at: Option<u64>,
    /// Soft-delete timestamp. Archived runs still execute if already
    /// runnable.
    pub deleted_at: Option<u64>,
    /// Request payload handed to the first task by the executor.
    pub overrides: serde_json::Value,
    /// The stimulus this run was created from.
    pub run_request: RunRequest,
    /// Ordered pipeline steps.
    pub task_runs: Vec<TaskRun>,
    /// Run-level outcome.
    pub result: RunResult,
}

impl JobRun {
    /// Creates an empty run for the given spec and request, with a fresh
    /// random id and no tasks materialized yet.
    pub fn new(job_spec_id: JobSpecId, run_request: RunRequest) -> Self {
        Self {
            id: RunId::random(),
            job_spec_id,
            status: RunStatus::Unstarted,
            payment: run_request.payment,
            creation_height: None,
            observed_height: None,
            finished_at: None,
            deleted_at: None,
            overrides: serde_json::Value::Null,
            run_request,
            task_runs: Vec::new(),
            result: RunResult::default(),
        }
    }

    /// Whether the run has been soft-deleted.
    pub const fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Index of the first task that has not completed.
    pub fn head_task_index(&self) -> Option<usize> {
        self.task_runs.iter().position(|task| task.status != RunStatus::Completed)
    }

    /// The first task that has not completed.
    pub fn head_task(&self) -> Option<&TaskRun> {
        let index = self.head_task_index()?;
        self.task_runs.get(index)
    }

    /// Mutable access to the first task that has not completed.
    pub fn head_task_mut(&mut self) -> Option<&mut TaskRun> {
        let index = self.head_task_index()?;
        self.task_runs.get_mut(index)
    }

    /// Marks the run errored with the given reason, stamping
    /// `finished_at`. Terminal status and the finish timestamp are always
    /// set together.
    pub fn set_error(&mut self, now: u64, message: impl Into<String>) {
        self.status = RunStatus::Errored;
        self.result.error_message = Some(message.into());
        self.finished_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskType;

    fn run_with_tasks(statuses: &[RunStatus]) -> JobRun {
        let mut run = JobRun::new(JobSpecId::random(), RunRequest::new());
        run.task_runs = statuses
            .iter()
            .map(|status| {
                let mut task = TaskRun::new(run.id, TaskSpec::bare(TaskType::no_op()));
                task.status = *status;
                task
            })
            .collect();
        run
    }

    #[test]
    fn head_task_skips_completed() {
        let run = run_with_tasks(&[RunStatus::Completed, RunStatus::Unstarted]);
        assert_eq!(run.head_task_index(), Some(1));
    }

    #[test]
    fn head_task_empty_when_all_completed() {
        let run = run_with_tasks(&[RunStatus::Completed]);
        assert!(run.head_task().is_none());
    }

    #[test]
    fn set_error_stamps_finished_at() {
        let mut run = run_with_tasks(&[]);
        run.set_error(42, "boom");
        assert_eq!(run.status, RunStatus::Errored);
        assert_eq!(run.finished_at, Some(42));
        assert_eq!(run.result.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn merge_data_is_keywise_for_objects() {
        let mut result = RunResult {
            data: serde_json::json!({"a": 1, "b": 2}),
            error_message: None,
        };
        result.merge_data(&serde_json::json!({"b": 3, "c": 4}));
        assert_eq!(result.data, serde_json::json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn confirmations_outstanding() {
        let mut task = TaskRun::new(RunId::random(), TaskSpec::bare(TaskType::no_op()));
        assert!(!task.confirmations_outstanding());
        task.minimum_confirmations = Some(2);
        assert!(task.confirmations_outstanding());
        task.confirmations = Some(2);
        assert!(!task.confirmations_outstanding());
    }
}
