use crate::sync::FetchOutcome;
use crate::ui::feed::intent::{FeedEvent, FeedIntent};
use crate::ui::feed::state::FeedViewState;
use crate::ui::mvi::Reducer;

pub struct FeedReducer;

impl Reducer for FeedReducer {
    type State = FeedViewState;
    type Intent = FeedEvent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            FeedEvent::Outcome(outcome) => {
                let view_mode = state.view_mode();
                match outcome {
                    FetchOutcome::Loading(articles) => FeedViewState::Loading {
                        articles,
                        view_mode,
                    },
                    FetchOutcome::Success(articles) => FeedViewState::Success {
                        articles,
                        view_mode,
                    },
                    FetchOutcome::Failed { data, message } => FeedViewState::Error {
                        articles: data,
                        message,
                        view_mode,
                    },
                }
            }
            FeedEvent::Intent(FeedIntent::ToggleViewMode) => match state {
                FeedViewState::Success {
                    articles,
                    view_mode,
                } => FeedViewState::Success {
                    articles,
                    view_mode: view_mode.toggled(),
                },
                FeedViewState::Error {
                    articles,
                    message,
                    view_mode,
                } => FeedViewState::Error {
                    articles,
                    message,
                    view_mode: view_mode.toggled(),
                },
                other => other,
            },
            FeedEvent::Intent(FeedIntent::ClearError) => match state {
                FeedViewState::Error { articles, .. } if articles.is_empty() => {
                    FeedViewState::Initial
                }
                FeedViewState::Error {
                    articles,
                    view_mode,
                    ..
                } => FeedViewState::Success {
                    articles,
                    view_mode,
                },
                other => other,
            },
            // The view model opens a sync cycle; the state moves with its
            // outcomes.
            FeedEvent::Intent(FeedIntent::Load | FeedIntent::Refresh) => state,
        }
    }
}
