//! FIFO intent queue with a single consumer.

use thiserror::Error;
use tokio::sync::mpsc;

/// The consumer side has shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("intent queue closed")]
pub struct QueueClosed;

/// Submission handle. Cheap to clone; every clone feeds the same consumer.
pub struct IntentQueue<M> {
    tx: mpsc::UnboundedSender<M>,
}

impl<M> Clone for IntentQueue<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// The single consumption end of an [`IntentQueue`].
pub struct IntentReceiver<M> {
    rx: mpsc::UnboundedReceiver<M>,
}

impl<M: Send + 'static> IntentQueue<M> {
    pub fn new() -> (IntentQueue<M>, IntentReceiver<M>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (IntentQueue { tx }, IntentReceiver { rx })
    }

    /// Enqueue without blocking. Messages are consumed in submission order.
    pub fn submit(&self, message: impl Into<M>) -> Result<(), QueueClosed> {
        self.tx.send(message.into()).map_err(|_| QueueClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<M> IntentReceiver<M> {
    /// Next message, or `None` once every queue handle is gone.
    pub async fn next(&mut self) -> Option<M> {
        self.rx.recv().await
    }
}
