use std::sync::Arc;

use crate::cache::CacheStore;
use crate::ui::detail::intent::{DetailEvent, DetailIntent, LookupResult};
use crate::ui::detail::reducer::DetailReducer;
use crate::ui::detail::state::DetailViewState;
use crate::ui::mvi::Reducer;
use crate::ui::queue::{IntentQueue, IntentReceiver, QueueClosed};
use crate::ui::view_state::{view_state_channel, ViewStatePublisher, ViewStateStream};

/// Detail view model: looks articles up in the cache, one intent at a time.
pub struct DetailViewModel {
    queue: IntentQueue<DetailIntent>,
    states: ViewStateStream<DetailViewState>,
}

impl DetailViewModel {
    /// Start the worker. Must be called from within a tokio runtime. The
    /// worker stops once the view model is dropped.
    pub fn spawn(cache: Arc<dyn CacheStore>) -> Self {
        let (queue, rx) = IntentQueue::new();
        let (publisher, states) = view_state_channel();

        let worker = DetailWorker {
            cache,
            publisher,
            state: DetailViewState::default(),
        };
        tokio::spawn(worker.run(rx));

        Self { queue, states }
    }

    pub fn submit(&self, intent: DetailIntent) -> Result<(), QueueClosed> {
        self.queue.submit(intent)
    }

    pub fn states(&self) -> ViewStateStream<DetailViewState> {
        self.states.clone()
    }
}

struct DetailWorker {
    cache: Arc<dyn CacheStore>,
    publisher: ViewStatePublisher<DetailViewState>,
    state: DetailViewState,
}

impl DetailWorker {
    async fn run(mut self, mut rx: IntentReceiver<DetailIntent>) {
        while let Some(intent) = rx.next().await {
            let url = match &intent {
                DetailIntent::LoadItem(Some(url)) => Some(url.clone()),
                _ => None,
            };
            self.apply(intent.into());

            if let Some(url) = url {
                let result = self.lookup(url).await;
                self.apply(result.into());
            }
        }
    }

    async fn lookup(&self, url: String) -> LookupResult {
        let cache = Arc::clone(&self.cache);
        match tokio::task::spawn_blocking(move || cache.get_by_identifier(&url)).await {
            Ok(result) => {
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "article lookup failed");
                }
                result.into()
            }
            Err(err) => {
                tracing::warn!(error = %err, "article lookup task failed");
                LookupResult::Failed(None)
            }
        }
    }

    fn apply(&mut self, event: DetailEvent) {
        self.state = DetailReducer::reduce(std::mem::take(&mut self.state), event);
        self.publisher.publish(self.state.clone());
    }
}
