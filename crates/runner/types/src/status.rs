//! Run status enumeration shared by job runs and task runs.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a job run or task run.
///
/// A run is created `Unstarted`, moves through the pending sub-states as
/// admission checks and external stimuli dictate, and ends in exactly one
/// of the terminal states. The same enumeration is reused per-task; a task
/// run tracks the subset of states that apply to a single pipeline step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No status has been assigned yet.
    #[default]
    Unstarted,
    /// The run is executable and either queued or executing.
    InProgress,
    /// The run is waiting for a node connection to be (re-)established.
    PendingConnection,
    /// The run is waiting for its initiating transaction to reach the
    /// required block depth.
    PendingConfirmations,
    /// The run is waiting for an external bridge to call back.
    PendingBridge,
    /// The run is waiting for a sleep task to elapse.
    PendingSleep,
    /// Every task completed successfully.
    Completed,
    /// The run failed; `result.error_message` carries the reason.
    Errored,
    /// The run was cancelled before completing.
    Cancelled,
}

impl RunStatus {
    /// Whether the status is terminal. Terminal runs never transition
    /// again and carry a `finished_at` timestamp.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Errored | Self::Cancelled)
    }

    /// Whether the run should be handed to the worker queue: either it is
    /// actively executable or a sleep is due to be re-checked.
    pub const fn is_runnable(&self) -> bool {
        matches!(self, Self::InProgress | Self::PendingSleep)
    }

    /// Whether the status is one of the pending sub-states.
    pub const fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::PendingConnection |
                Self::PendingConfirmations |
                Self::PendingBridge |
                Self::PendingSleep
        )
    }

    /// Whether no status has been assigned yet.
    pub const fn is_unstarted(&self) -> bool {
        matches!(self, Self::Unstarted)
    }

    /// All statuses, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Unstarted,
        Self::InProgress,
        Self::PendingConnection,
        Self::PendingConfirmations,
        Self::PendingBridge,
        Self::PendingSleep,
        Self::Completed,
        Self::Errored,
        Self::Cancelled,
    ];
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unstarted => "unstarted",
            Self::InProgress => "in_progress",
            Self::PendingConnection => "pending_connection",
            Self::PendingConfirmations => "pending_confirmations",
            Self::PendingBridge => "pending_bridge",
            Self::PendingSleep => "pending_sleep",
            Self::Completed => "completed",
            Self::Errored => "errored",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}
