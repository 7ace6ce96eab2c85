//! Worker queue hand-off.

use crate::metrics::Metrics;
use async_trait::async_trait;
use derive_more::Constructor;
use std::{fmt::Debug, sync::Arc};
use strand_runner_types::RunId;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

/// Errors surfaced by a worker queue implementation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The executor side of the queue is gone.
    #[error("worker queue closed")]
    Closed,
}

/// Delivery of runnable runs to the executor pool.
///
/// Delivery is at-least-once: the executor resumes runs idempotently, and
/// anything lost here is re-delivered by the executor bootstrap path.
#[async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait RunQueue: Debug + Send + Sync {
    /// Delivers a run id to the executor.
    async fn run(&self, id: RunId) -> Result<(), QueueError>;
}

/// [`RunQueue`] over an unbounded channel to an in-process executor.
#[derive(Debug, Clone)]
pub struct ChannelRunQueue {
    tx: mpsc::UnboundedSender<RunId>,
}

impl ChannelRunQueue {
    /// Creates the queue and the receiving end the executor drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RunId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl RunQueue for ChannelRunQueue {
    async fn run(&self, id: RunId) -> Result<(), QueueError> {
        self.tx.send(id).map_err(|_| QueueError::Closed)
    }
}

/// Hands runnable runs to the worker queue, absorbing queue-side errors.
///
/// Durability lives in the store: a failed enqueue is logged and dropped,
/// and the executor bootstrap (`resume_all_in_progress`) re-delivers the
/// run on restart. The persisted transition is never rolled back.
#[derive(Debug, Constructor)]
pub struct QueueDispatcher<Q> {
    queue: Arc<Q>,
}

impl<Q: RunQueue> QueueDispatcher<Q> {
    /// Enqueues `id`, logging (not propagating) any queue error.
    pub async fn dispatch(&self, id: &RunId) {
        match self.queue.run(*id).await {
            Ok(()) => Metrics::record_enqueued(),
            Err(err) => {
                warn!(
                    target: "runner::queue",
                    %id,
                    %err,
                    "Failed to enqueue run; executor bootstrap will re-deliver it"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_queue_delivers_ids() {
        let (queue, mut rx) = ChannelRunQueue::new();
        let id = RunId::random();

        queue.run(id).await.unwrap();
        assert_eq!(rx.recv().await, Some(id));
    }

    #[tokio::test]
    async fn channel_queue_errors_when_executor_is_gone() {
        let (queue, rx) = ChannelRunQueue::new();
        drop(rx);

        assert_eq!(queue.run(RunId::random()).await, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn dispatcher_absorbs_queue_errors() {
        let (queue, rx) = ChannelRunQueue::new();
        drop(rx);

        // Must not panic or propagate.
        QueueDispatcher::new(Arc::new(queue)).dispatch(&RunId::random()).await;
    }
}
