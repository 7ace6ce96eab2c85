//! The stimulus payload a run is created from.

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// The payload of a run-creating stimulus.
///
/// Requests initiated by an on-chain log carry the transaction hash and
/// block hash of the initiating log; reorg verification compares the block
/// hash against the transaction receipt once confirmations are met.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Caller-supplied request identifier, echoed back on the run.
    pub request_id: Option<String>,
    /// Hash of the initiating transaction, for log-initiated runs.
    pub tx_hash: Option<B256>,
    /// Hash of the block carrying the initiating log.
    pub block_hash: Option<B256>,
    /// Token amount offered with the request. Absent means zero.
    pub payment: Option<U256>,
}

impl RunRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the request was initiated by an on-chain log that can be
    /// checked against the canonical chain.
    pub const fn on_chain(&self) -> bool {
        self.tx_hash.is_some() && self.block_hash.is_some()
    }
}
