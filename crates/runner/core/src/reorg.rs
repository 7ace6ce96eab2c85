//! Chain-reorg verification for log-initiated runs.

use crate::RunnerError;
use alloy_primitives::B256;
use alloy_rpc_client::RpcClient;
use async_trait::async_trait;
use derive_more::Constructor;
use std::{fmt::Debug, sync::Arc};
use strand_runner_types::{JobRun, TxReceipt};
use tracing::{debug, warn};

/// Canonical-chain verdict for a run's initiating log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainInclusion {
    /// The initiating log still lies on the canonical chain (or the run
    /// was not initiated on-chain and there is nothing to check).
    Canonical,
    /// The block carrying the initiating log was orphaned.
    Reorged,
    /// The receipt is not available yet; try again on the next tick.
    Unknown,
}

/// Read-only access to execution-layer transaction receipts.
#[async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait ReceiptProvider: Debug + Send + Sync {
    /// Fetches the receipt for `tx_hash`, or `None` while the transaction
    /// is not yet mined.
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, RunnerError>;
}

/// [`ReceiptProvider`] backed by an execution-layer RPC endpoint.
#[derive(Debug, Clone, Constructor)]
pub struct RpcReceiptProvider {
    rpc_client: RpcClient,
}

#[async_trait]
impl ReceiptProvider for RpcReceiptProvider {
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, RunnerError> {
        self.rpc_client
            .request::<_, Option<TxReceipt>>("eth_getTransactionReceipt", (tx_hash,))
            .await
            .map_err(|err| {
                warn!(
                    target: "runner::reorg",
                    %tx_hash,
                    %err,
                    "Failed to fetch transaction receipt from RPC"
                );
                RunnerError::Receipt(err.to_string())
            })
    }
}

/// Verifies that the block hash recorded on a run's initiating log still
/// lies on the canonical chain.
#[derive(Debug, Constructor)]
pub struct ReorgValidator<P> {
    provider: Arc<P>,
}

impl<P: ReceiptProvider> ReorgValidator<P> {
    /// Compares the initiating log's block hash against the transaction
    /// receipt.
    ///
    /// Requests without both a transaction hash and a block hash were not
    /// initiated on-chain and verify as [`ChainInclusion::Canonical`]. A
    /// missing (or still-pending) receipt is "not yet available", not a
    /// reorg.
    pub async fn verify(&self, run: &JobRun) -> Result<ChainInclusion, RunnerError> {
        let (Some(tx_hash), Some(block_hash)) =
            (run.run_request.tx_hash, run.run_request.block_hash)
        else {
            return Ok(ChainInclusion::Canonical);
        };

        let Some(receipt) = self.provider.transaction_receipt(tx_hash).await? else {
            debug!(target: "runner::reorg", id = %run.id, %tx_hash, "Receipt not yet available");
            return Ok(ChainInclusion::Unknown);
        };

        match receipt.block_hash {
            None => Ok(ChainInclusion::Unknown),
            Some(hash) if hash == block_hash => Ok(ChainInclusion::Canonical),
            Some(hash) => {
                warn!(
                    target: "runner::reorg",
                    id = %run.id,
                    expected = %block_hash,
                    got = %hash,
                    "Initiating log is on an orphaned branch"
                );
                Ok(ChainInclusion::Reorged)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_transport::mock::*;
    use strand_runner_types::{JobSpecId, RunRequest};

    fn rpc_provider(asserter: &Asserter) -> RpcReceiptProvider {
        let transport = MockTransport::new(asserter.clone());
        RpcReceiptProvider::new(RpcClient::new(transport, false))
    }

    fn on_chain_run(tx_hash: B256, block_hash: B256) -> JobRun {
        let request = RunRequest {
            tx_hash: Some(tx_hash),
            block_hash: Some(block_hash),
            ..Default::default()
        };
        JobRun::new(JobSpecId::random(), request)
    }

    #[tokio::test]
    async fn off_chain_requests_verify_without_rpc() {
        let validator = ReorgValidator::new(Arc::new(rpc_provider(&Asserter::new())));
        let run = JobRun::new(JobSpecId::random(), RunRequest::new());

        let inclusion = validator.verify(&run).await.unwrap();
        assert_eq!(inclusion, ChainInclusion::Canonical);
    }

    #[tokio::test]
    async fn matching_block_hash_is_canonical() {
        let tx_hash = B256::from([1u8; 32]);
        let block_hash = B256::from([2u8; 32]);

        let asserter = Asserter::new();
        asserter.push_success(&TxReceipt::new(tx_hash, Some(block_hash), Some(3)));

        let validator = ReorgValidator::new(Arc::new(rpc_provider(&asserter)));
        let inclusion = validator.verify(&on_chain_run(tx_hash, block_hash)).await.unwrap();
        assert_eq!(inclusion, ChainInclusion::Canonical);
    }

    #[tokio::test]
    async fn differing_block_hash_is_a_reorg() {
        let tx_hash = B256::from([1u8; 32]);
        let block_hash = B256::from([2u8; 32]);
        let other_hash = B256::from([3u8; 32]);

        let asserter = Asserter::new();
        asserter.push_success(&TxReceipt::new(tx_hash, Some(other_hash), Some(3)));

        let validator = ReorgValidator::new(Arc::new(rpc_provider(&asserter)));
        let inclusion = validator.verify(&on_chain_run(tx_hash, block_hash)).await.unwrap();
        assert_eq!(inclusion, ChainInclusion::Reorged);
    }

    #[tokio::test]
    async fn missing_receipt_is_unknown() {
        let tx_hash = B256::from([1u8; 32]);

        let asserter = Asserter::new();
        asserter.push_success(&None::<TxReceipt>);

        let validator = ReorgValidator::new(Arc::new(rpc_provider(&asserter)));
        let inclusion =
            validator.verify(&on_chain_run(tx_hash, B256::from([2u8; 32]))).await.unwrap();
        assert_eq!(inclusion, ChainInclusion::Unknown);
    }

    #[tokio::test]
    async fn unmined_receipt_is_unknown() {
        let tx_hash = B256::from([1u8; 32]);

        let asserter = Asserter::new();
        asserter.push_success(&TxReceipt::new(tx_hash, None, None));

        let validator = ReorgValidator::new(Arc::new(rpc_provider(&asserter)));
        let inclusion =
            validator.verify(&on_chain_run(tx_hash, B256::from([2u8; 32]))).await.unwrap();
        assert_eq!(inclusion, ChainInclusion::Unknown);
    }

    #[tokio::test]
    async fn rpc_failure_is_transient() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("connection refused");

        let validator = ReorgValidator::new(Arc::new(rpc_provider(&asserter)));
        let err = validator
            .verify(&on_chain_run(B256::from([1u8; 32]), B256::from([2u8; 32])))
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Receipt(_)));
    }
}
