//! Job specifications: the declarative templates runs are materialized
//! from.

use crate::JobSpecId;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Identifies a task adapter by name.
///
/// Task type names are case-insensitive; [`TaskType::new`] normalizes to
/// lowercase so that lookups against the bridge registry are stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    /// Creates a task type, normalizing the name to lowercase.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().to_lowercase())
    }

    /// The built-in pass-through adapter.
    pub fn no_op() -> Self {
        Self::new("noop")
    }

    /// The task type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TaskType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single step of a job specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Constructor)]
pub struct TaskSpec {
    /// The adapter executing this step.
    pub task_type: TaskType,
    /// Block confirmations this step requires before executing, if the
    /// spec pins its own floor.
    pub confirmations: Option<u32>,
    /// Adapter parameters. Copied into each materialized task run so that
    /// later edits to the spec never alter historical runs.
    pub params: serde_json::Value,
}

impl TaskSpec {
    /// A parameterless spec for the given adapter.
    pub const fn bare(task_type: TaskType) -> Self {
        Self { task_type, confirmations: None, params: serde_json::Value::Null }
    }
}

/// The source kinds a run-creating stimulus can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiatorKind {
    /// An inbound HTTP request.
    Web,
    /// An on-chain log emitted by a watched contract.
    RunLog,
    /// A local schedule.
    Cron,
}

/// A declared entry point of a job specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Constructor)]
pub struct Initiator {
    /// The stimulus source this initiator accepts.
    pub kind: InitiatorKind,
}

/// A declarative job template: an ordered list of task specs plus the
/// initiators allowed to trigger it and an optional payment floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Unique identifier of the spec.
    pub id: JobSpecId,
    /// Entry points allowed to create runs of this job.
    pub initiators: Vec<Initiator>,
    /// Ordered pipeline steps.
    pub tasks: Vec<TaskSpec>,
    /// Job-level minimum payment. Takes precedence over the node
    /// operator's configured floor when both are set.
    pub min_payment: Option<U256>,
}

impl JobSpec {
    /// Creates a spec with a fresh random id.
    pub fn new(initiators: Vec<Initiator>, tasks: Vec<TaskSpec>, min_payment: Option<U256>) -> Self {
        Self { id: JobSpecId::random(), initiators, tasks, min_payment }
    }

    /// Whether the spec declares an initiator of the given kind.
    pub fn has_initiator(&self, kind: InitiatorKind) -> bool {
        self.initiators.iter().any(|initiator| initiator.kind == kind)
    }
}
