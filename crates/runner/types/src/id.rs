//! Opaque identifiers for job specs, job runs, and task runs.

use alloy_primitives::B256;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Unique identifier of a job specification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobSpecId(B256);

impl JobSpecId {
    /// Generates a fresh random identifier.
    pub fn random() -> Self {
        Self(B256::random())
    }

    /// Wraps an existing hash as an identifier.
    pub const fn new(inner: B256) -> Self {
        Self(inner)
    }
}

impl fmt::Display for JobSpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier of a job run, assigned at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(B256);

impl RunId {
    /// Generates a fresh random identifier.
    pub fn random() -> Self {
        Self(B256::random())
    }

    /// Wraps an existing hash as an identifier.
    pub const fn new(inner: B256) -> Self {
        Self(inner)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier of a task run within a job run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(B256);

impl TaskId {
    /// Generates a fresh random identifier.
    pub fn random() -> Self {
        Self(B256::random())
    }

    /// Wraps an existing hash as an identifier.
    pub const fn new(inner: B256) -> Self {
        Self(inner)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
