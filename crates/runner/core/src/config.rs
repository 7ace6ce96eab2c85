//! Runner configuration.

use alloy_primitives::U256;
use derive_more::Constructor;

/// Configuration for the run manager.
#[derive(Debug, Clone, Default, Constructor)]
pub struct Config {
    /// Default floor for required block confirmations on tasks that do
    /// not set their own (`MIN_INCOMING_CONFIRMATIONS`).
    pub min_incoming_confirmations: u32,

    /// The node operator's payment floor (`MINIMUM_CONTRACT_PAYMENT`).
    /// A job spec's own minimum takes precedence when both are set.
    pub minimum_contract_payment: Option<U256>,
}
