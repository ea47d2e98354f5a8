//! Replay-latest view state stream.
//!
//! The [`ViewStatePublisher`] is owned by exactly one consumer loop; every
//! other party holds a read-only [`ViewStateStream`]. New subscribers
//! receive the current state first and then each published transition in
//! order, without coalescing.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::ui::mvi::UiState;

struct Shared<S> {
    current: S,
    subscribers: Vec<mpsc::UnboundedSender<S>>,
}

/// Write side of a view state stream.
pub struct ViewStatePublisher<S> {
    shared: Arc<Mutex<Shared<S>>>,
}

/// Read side of a view state stream.
pub struct ViewStateStream<S> {
    shared: Arc<Mutex<Shared<S>>>,
}

impl<S> Clone for ViewStateStream<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Create a publisher/stream pair seeded with `S::default()`.
pub fn view_state_channel<S: UiState>() -> (ViewStatePublisher<S>, ViewStateStream<S>) {
    let shared = Arc::new(Mutex::new(Shared {
        current: S::default(),
        subscribers: Vec::new(),
    }));
    (
        ViewStatePublisher {
            shared: Arc::clone(&shared),
        },
        ViewStateStream { shared },
    )
}

impl<S: UiState> ViewStatePublisher<S> {
    pub fn current(&self) -> S {
        self.shared.lock().current.clone()
    }

    /// Replace the current state and deliver it to every live subscriber.
    pub fn publish(&self, state: S) {
        let mut shared = self.shared.lock();
        shared
            .subscribers
            .retain(|tx| tx.send(state.clone()).is_ok());
        shared.current = state;
    }
}

impl<S: UiState> ViewStateStream<S> {
    /// The most recently published state.
    pub fn latest(&self) -> S {
        self.shared.lock().current.clone()
    }

    /// Follow the stream, starting with the current state.
    pub fn subscribe(&self) -> ViewStateSubscription<S> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shared = self.shared.lock();
        // Seeded under the lock so no publish can slip in between.
        let _ = tx.send(shared.current.clone());
        shared.subscribers.push(tx);
        ViewStateSubscription { rx }
    }
}

pub struct ViewStateSubscription<S> {
    rx: mpsc::UnboundedReceiver<S>,
}

impl<S> ViewStateSubscription<S> {
    /// Next state, or `None` once the publisher is gone and everything
    /// buffered has been read.
    pub async fn next(&mut self) -> Option<S> {
        self.rx.recv().await
    }

    /// Next state if one is already buffered.
    pub fn try_next(&mut self) -> Option<S> {
        self.rx.try_recv().ok()
    }
}

impl<S> Drop for ViewStatePublisher<S> {
    fn drop(&mut self) {
        self.shared.lock().subscribers.clear();
    }
}
