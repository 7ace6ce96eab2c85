//! Minimal transaction receipt shape used for reorg verification.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// The subset of an execution-layer transaction receipt the runner needs:
/// where (and whether) the initiating transaction was mined.
///
/// A transaction that is known but not yet mined has neither a block hash
/// nor a block number; a missing receipt altogether surfaces as the RPC
/// returning `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Constructor)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// Hash of the receipted transaction.
    pub transaction_hash: B256,
    /// Hash of the block the transaction was included in.
    pub block_hash: Option<B256>,
    /// Number of the block the transaction was included in.
    #[serde(with = "alloy_serde::quantity::opt")]
    pub block_number: Option<u64>,
}

impl TxReceipt {
    /// Whether the transaction has been mined into a block.
    pub const fn mined(&self) -> bool {
        self.block_hash.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_rpc_shape() {
        let raw = r#"{
            "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "blockHash": "0x2222222222222222222222222222222222222222222222222222222222222222",
            "blockNumber": "0x3"
        }"#;
        let receipt: TxReceipt = serde_json::from_str(raw).unwrap();
        assert!(receipt.mined());
        assert_eq!(receipt.block_number, Some(3));
    }

    #[test]
    fn pending_receipt_has_no_block() {
        let raw = r#"{
            "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "blockHash": null,
            "blockNumber": null
        }"#;
        let receipt: TxReceipt = serde_json::from_str(raw).unwrap();
        assert!(!receipt.mined());
    }
}
