use crate::ui::detail::intent::{DetailEvent, DetailIntent, LookupResult};
use crate::ui::detail::state::DetailViewState;
use crate::ui::mvi::Reducer;

pub const MISSING_URL_MESSAGE: &str = "Article URL is missing";
pub const NOT_FOUND_MESSAGE: &str = "Article not found";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load article";

pub struct DetailReducer;

impl Reducer for DetailReducer {
    type State = DetailViewState;
    type Intent = DetailEvent;

    fn reduce(_state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            DetailEvent::Intent(DetailIntent::LoadItem(None)) => {
                DetailViewState::Error(MISSING_URL_MESSAGE.to_string())
            }
            DetailEvent::Intent(DetailIntent::LoadItem(Some(_))) => DetailViewState::Loading,
            DetailEvent::Intent(DetailIntent::ClearError) => DetailViewState::Initial,
            DetailEvent::Lookup(LookupResult::Found(article)) => DetailViewState::Success(article),
            DetailEvent::Lookup(LookupResult::NotFound) => {
                DetailViewState::Error(NOT_FOUND_MESSAGE.to_string())
            }
            DetailEvent::Lookup(LookupResult::Failed(message)) => DetailViewState::Error(
                message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| LOAD_FAILED_MESSAGE.to_string()),
            ),
        }
    }
}
