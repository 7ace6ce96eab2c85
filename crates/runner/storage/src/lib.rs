//! Persistence abstraction for the strand job run manager.
//!
//! This crate defines the storage traits the runner mutates job runs
//! through, the storage error type shared by every implementation, and an
//! in-memory reference store.
//!
//! The contract every implementation must honor:
//!
//! - Saving a run replaces the whole record: a transition's
//!   `(status, task statuses, confirmations, finished_at, result)` tuple
//!   becomes visible in full or not at all.
//! - Run selection by pending status excludes soft-deleted runs, while
//!   [`executable runs`](JobRunStorageReader::executable_job_runs) include
//!   them: archived runs that are already runnable have been paid for and
//!   must still complete.

mod error;
pub use error::{NotFoundError, StorageError};

mod traits;
pub use traits::{
    BridgeStorageReader, JobRunStorage, JobRunStorageReader, JobRunStorageWriter,
    JobSpecStorageReader, RunnerStore,
};

mod memory;
pub use memory::MemoryStore;
