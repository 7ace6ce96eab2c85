//! Bridge definitions and bridge callback payloads.

use crate::{RunStatus, TaskType};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use url::Url;

/// An externally executed task type.
///
/// Each bridge is a paid off-chain call: its minimum contract payment is
/// added to the aggregate admission floor for every run containing a task
/// of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Constructor)]
pub struct BridgeType {
    /// The task type name the bridge is registered under.
    pub name: TaskType,
    /// Endpoint the executor posts task payloads to.
    pub url: Url,
    /// Block confirmations the bridge requires before execution.
    pub confirmations: u32,
    /// Minimum payment the bridge charges per run.
    pub minimum_contract_payment: Option<U256>,
}

/// The payload a bridge posts back when an external task finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeResponse {
    /// Outcome reported by the bridge. `Completed` and `Errored` are
    /// meaningful; anything else leaves the run pending.
    pub status: RunStatus,
    /// Result data, merged into the head task's result on completion.
    pub data: serde_json::Value,
    /// Failure reason when `status` is `Errored`.
    pub error_message: Option<String>,
}

impl BridgeResponse {
    /// A completed response carrying `data`.
    pub const fn completed(data: serde_json::Value) -> Self {
        Self { status: RunStatus::Completed, data, error_message: None }
    }

    /// An errored response with the given reason.
    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Errored,
            data: serde_json::Value::Null,
            error_message: Some(message.into()),
        }
    }
}
