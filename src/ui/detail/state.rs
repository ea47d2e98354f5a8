//! State for the single-article detail view.

use crate::model::Article;
use crate::ui::mvi::UiState;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailViewState {
    #[default]
    Initial,
    Loading,
    Success(Article),
    Error(String),
}

impl UiState for DetailViewState {}

impl DetailViewState {
    pub fn article(&self) -> Option<&Article> {
        match self {
            DetailViewState::Success(article) => Some(article),
            _ => None,
        }
    }
}
