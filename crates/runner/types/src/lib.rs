//! Core types shared across runner components.
//!
//! This crate defines the fundamental data structures used within the
//! strand job run manager: job specifications, job runs and their task
//! runs, bridge definitions, run requests, and the transaction receipt
//! shape consumed by reorg verification.

mod id;
pub use id::{JobSpecId, RunId, TaskId};

mod status;
pub use status::RunStatus;

mod run;
pub use run::{JobRun, RunResult, TaskRun};

mod spec;
pub use spec::{Initiator, InitiatorKind, JobSpec, TaskSpec, TaskType};

mod bridge;
pub use bridge::{BridgeResponse, BridgeType};

mod request;
pub use request::RunRequest;

mod receipt;
pub use receipt::TxReceipt;
