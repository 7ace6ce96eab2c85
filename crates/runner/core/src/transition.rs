//! Pure state transition logic over `(run, stimulus)`.
//!
//! The transitioner never touches storage, the chain, or the queue: the
//! manager resolves those inputs first (the canonical-chain verdict in
//! particular) and persists whatever the transition produced. Every
//! `(status, stimulus)` pair has an explicit arm; pairs with nothing to do
//! report [`Outcome::Unchanged`] rather than silently drifting.

use crate::{ChainInclusion, RunnerError};
use strand_runner_types::{BridgeResponse, JobRun, RunStatus};

/// Error message persisted on runs resumed with an empty task list.
pub const EMPTY_TASKS_ERROR: &str = "job run has no task runs to resume";

/// Error message persisted on runs whose initiating log was orphaned.
pub const REORG_ERROR: &str = "initiating log is no longer on the canonical chain";

/// An external stimulus applied to a run.
#[derive(Debug, Clone)]
pub enum Stimulus {
    /// A bridge posted back the result of an external task.
    BridgeReply(BridgeResponse),
    /// The chain advanced. `height` is absent for replays that carry no
    /// height; `inclusion` is the canonical-chain verdict the manager
    /// resolved for this run (only consulted once confirmations are met).
    BlockTick {
        /// The observed block height.
        height: Option<u64>,
        /// Whether the initiating log survived on the canonical chain.
        inclusion: ChainInclusion,
    },
    /// The node connection was re-established.
    ConnectionRestored,
    /// An operator asked for the run to be cancelled.
    Cancellation,
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed; skip the save.
    Unchanged,
    /// The run changed; persist it.
    Updated,
    /// The run changed and is executable; persist it, then enqueue.
    Runnable,
}

/// Computes the next state of `run` under `stimulus`, mutating the run in
/// place. `now` stamps `finished_at` on transitions into a terminal
/// status.
pub fn transition(
    run: &mut JobRun,
    stimulus: &Stimulus,
    now: u64,
) -> Result<Outcome, RunnerError> {
    match stimulus {
        Stimulus::BridgeReply(response) => bridge_reply(run, response, now),
        Stimulus::BlockTick { height, inclusion } => block_tick(run, *height, *inclusion, now),
        Stimulus::ConnectionRestored => connection_restored(run, now),
        Stimulus::Cancellation => cancellation(run, now),
    }
}

/// Confirmations observed for a task at `height`, capped at `target`.
///
/// A lagging node (height below the creation height) clamps to zero
/// rather than decrementing past it.
pub(crate) fn observed_confirmations(creation_height: u64, height: u64, target: u32) -> u32 {
    if height < creation_height {
        return 0;
    }
    let depth = height - creation_height + 1;
    depth.min(u64::from(target)) as u32
}

fn bridge_reply(
    run: &mut JobRun,
    response: &BridgeResponse,
    now: u64,
) -> Result<Outcome, RunnerError> {
    if run.status != RunStatus::PendingBridge {
        return Err(RunnerError::InvalidState { id: run.id, status: run.status });
    }
    if run.task_runs.is_empty() {
        run.set_error(now, EMPTY_TASKS_ERROR);
        return Ok(Outcome::Updated);
    }

    match response.status {
        RunStatus::Errored => {
            let message = response
                .error_message
                .clone()
                .unwrap_or_else(|| "bridge reported an error".to_string());
            if let Some(task) = run.head_task_mut() {
                task.status = RunStatus::Errored;
                task.result.error_message = Some(message.clone());
            }
            run.set_error(now, message);
            Ok(Outcome::Updated)
        }
        RunStatus::Completed => {
            if let Some(task) = run.head_task_mut() {
                task.result.merge_data(&response.data);
                task.status = RunStatus::Completed;
            }
            if run.head_task().is_some() {
                run.status = RunStatus::InProgress;
                Ok(Outcome::Runnable)
            } else {
                run.status = RunStatus::Completed;
                run.finished_at = Some(now);
                Ok(Outcome::Updated)
            }
        }
        // The bridge has not finished; the run keeps waiting.
        _ => Ok(Outcome::Unchanged),
    }
}

fn block_tick(
    run: &mut JobRun,
    height: Option<u64>,
    inclusion: ChainInclusion,
    now: u64,
) -> Result<Outcome, RunnerError> {
    if !matches!(run.status, RunStatus::PendingConfirmations | RunStatus::PendingConnection) {
        // Ticks only move runs waiting on the chain.
        return Ok(Outcome::Unchanged);
    }
    if run.task_runs.is_empty() {
        run.set_error(now, EMPTY_TASKS_ERROR);
        return Ok(Outcome::Updated);
    }
    let Some(height) = height else {
        // No height to measure against; the empty-task guard above is the
        // only effect of a height-less tick.
        return Ok(Outcome::Unchanged);
    };

    run.observed_height = Some(height);
    let creation_height = run.creation_height.unwrap_or(height);

    let Some(index) = run.head_task_index() else {
        // Every task already completed; close the run out.
        run.status = RunStatus::Completed;
        run.finished_at = Some(now);
        return Ok(Outcome::Updated);
    };
    let task = &mut run.task_runs[index];

    let target = task.minimum_confirmations.unwrap_or(0);
    let observed = observed_confirmations(creation_height, height, target);
    if target > 0 {
        task.confirmations = Some(observed);
    }

    if observed < target {
        task.status = RunStatus::PendingConfirmations;
        run.status = RunStatus::PendingConfirmations;
        return Ok(Outcome::Updated);
    }

    match inclusion {
        ChainInclusion::Unknown => {
            // Receipt not available yet; stay put and retry next tick.
            task.status = RunStatus::PendingConfirmations;
            run.status = RunStatus::PendingConfirmations;
            Ok(Outcome::Updated)
        }
        ChainInclusion::Reorged => {
            task.status = RunStatus::Errored;
            task.result.error_message = Some(REORG_ERROR.to_string());
            run.set_error(now, REORG_ERROR);
            Ok(Outcome::Updated)
        }
        ChainInclusion::Canonical => {
            task.status = RunStatus::InProgress;
            run.status = RunStatus::InProgress;
            Ok(Outcome::Runnable)
        }
    }
}

fn connection_restored(run: &mut JobRun, now: u64) -> Result<Outcome, RunnerError> {
    if run.status != RunStatus::PendingConnection {
        // Reconnects only move runs that were waiting for one.
        return Ok(Outcome::Unchanged);
    }
    if run.task_runs.is_empty() {
        run.set_error(now, EMPTY_TASKS_ERROR);
        return Ok(Outcome::Updated);
    }

    let Some(index) = run.head_task_index() else {
        run.status = RunStatus::Completed;
        run.finished_at = Some(now);
        return Ok(Outcome::Updated);
    };
    let task = &mut run.task_runs[index];

    if task.confirmations_outstanding() {
        task.status = RunStatus::PendingConfirmations;
        run.status = RunStatus::PendingConfirmations;
        Ok(Outcome::Updated)
    } else {
        task.status = RunStatus::InProgress;
        run.status = RunStatus::InProgress;
        Ok(Outcome::Runnable)
    }
}

fn cancellation(run: &mut JobRun, now: u64) -> Result<Outcome, RunnerError> {
    if run.status.is_terminal() {
        return Ok(Outcome::Unchanged);
    }
    if let Some(task) = run.head_task_mut() {
        task.status = RunStatus::Cancelled;
    }
    run.status = RunStatus::Cancelled;
    run.finished_at = Some(now);
    Ok(Outcome::Updated)
}
