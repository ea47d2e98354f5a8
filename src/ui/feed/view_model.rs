//! Feed view model: the single writer of [`FeedViewState`].
//!
//! One worker task drains the queue. `Load`/`Refresh` open a sync cycle and
//! the worker applies its outcomes until the fetch settles; from then on a
//! forwarder task pushes live cache updates back into the same queue, tagged
//! with the cycle's generation. Opening a new cycle cancels the previous one,
//! and anything it still had queued is dropped on arrival.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::cancel::CancelToken;
use crate::sync::{FetchOutcome, FetchPolicy, ResourceSynchronizer, SyncStream};
use crate::ui::feed::intent::{FeedEvent, FeedIntent};
use crate::ui::feed::reducer::FeedReducer;
use crate::ui::feed::state::FeedViewState;
use crate::ui::mvi::Reducer;
use crate::ui::queue::{IntentQueue, IntentReceiver, QueueClosed};
use crate::ui::view_state::{view_state_channel, ViewStatePublisher, ViewStateStream};

enum FeedMessage {
    Intent(FeedIntent),
    Outcome { generation: u64, outcome: FetchOutcome },
}

impl From<FeedIntent> for FeedMessage {
    fn from(intent: FeedIntent) -> Self {
        FeedMessage::Intent(intent)
    }
}

pub struct FeedViewModel {
    queue: IntentQueue<FeedMessage>,
    states: ViewStateStream<FeedViewState>,
    worker: JoinHandle<()>,
}

impl FeedViewModel {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn spawn(synchronizer: Arc<ResourceSynchronizer>) -> Self {
        let (queue, rx) = IntentQueue::new();
        let (publisher, states) = view_state_channel();

        let worker = FeedWorker {
            synchronizer,
            publisher,
            state: FeedViewState::default(),
            feedback: queue.clone(),
            generation: 0,
            active: None,
        };
        let worker = tokio::spawn(worker.run(rx));

        Self {
            queue,
            states,
            worker,
        }
    }

    /// Enqueue an intent. Never blocks; intents are handled in order.
    pub fn submit(&self, intent: FeedIntent) -> Result<(), QueueClosed> {
        self.queue.submit(intent)
    }

    pub fn states(&self) -> ViewStateStream<FeedViewState> {
        self.states.clone()
    }
}

impl Drop for FeedViewModel {
    fn drop(&mut self) {
        // The worker holds a queue handle for its forwarders, so it would
        // never see the queue close on its own.
        self.worker.abort();
    }
}

/// Cancels its cycle when dropped.
struct ActiveCycle(CancelToken);

impl Drop for ActiveCycle {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

struct FeedWorker {
    synchronizer: Arc<ResourceSynchronizer>,
    publisher: ViewStatePublisher<FeedViewState>,
    state: FeedViewState,
    feedback: IntentQueue<FeedMessage>,
    generation: u64,
    active: Option<ActiveCycle>,
}

impl FeedWorker {
    async fn run(mut self, mut rx: IntentReceiver<FeedMessage>) {
        while let Some(message) = rx.next().await {
            match message {
                FeedMessage::Intent(FeedIntent::Load) => self.start_cycle(FetchPolicy::Auto).await,
                FeedMessage::Intent(FeedIntent::Refresh) => {
                    self.start_cycle(FetchPolicy::Force).await
                }
                FeedMessage::Intent(intent) => self.apply(intent.into()),
                FeedMessage::Outcome {
                    generation,
                    outcome,
                } => {
                    if generation == self.generation {
                        self.apply(outcome.into());
                    } else {
                        tracing::debug!(generation, current = self.generation, "dropping stale outcome");
                    }
                }
            }
        }
    }

    async fn start_cycle(&mut self, policy: FetchPolicy) {
        self.active = None;
        self.generation += 1;
        tracing::debug!(generation = self.generation, ?policy, "opening sync cycle");

        let mut stream = self.synchronizer.sync(policy);
        let cycle = ActiveCycle(stream.cancel_token());

        while let Some(outcome) = stream.next().await {
            let settled = outcome.is_settled();
            self.apply(outcome.into());
            if settled {
                break;
            }
        }

        self.active = Some(cycle);
        spawn_forwarder(stream, self.generation, self.feedback.clone());
    }

    fn apply(&mut self, event: FeedEvent) {
        self.state = FeedReducer::reduce(std::mem::take(&mut self.state), event);
        self.publisher.publish(self.state.clone());
    }
}

fn spawn_forwarder(mut stream: SyncStream, generation: u64, feedback: IntentQueue<FeedMessage>) {
    tokio::spawn(async move {
        while let Some(outcome) = stream.next().await {
            if feedback
                .submit(FeedMessage::Outcome {
                    generation,
                    outcome,
                })
                .is_err()
            {
                break;
            }
        }
    });
}
