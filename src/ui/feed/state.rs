//! State for the headline feed.

use crate::model::Article;
use crate::ui::mvi::UiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Grid,
            ViewMode::Grid => ViewMode::List,
        }
    }
}

/// Feed view state machine.
///
/// `articles` is always the latest known-good snapshot. The view mode rides
/// along through `Loading` so the next `Success`/`Error` can restore it, and
/// is reset by `Initial`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedViewState {
    /// Nothing requested yet, or an empty error was dismissed.
    #[default]
    Initial,

    /// A sync cycle is fetching; existing content stays visible.
    Loading {
        articles: Vec<Article>,
        view_mode: ViewMode,
    },

    Success {
        articles: Vec<Article>,
        view_mode: ViewMode,
    },

    /// The last fetch failed. Content from before the failure is kept.
    Error {
        articles: Vec<Article>,
        message: String,
        view_mode: ViewMode,
    },
}

impl UiState for FeedViewState {}

/// What the view should draw for a given state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presentation<'a> {
    Blank,
    /// Loading with nothing to show yet.
    Spinner,
    Content {
        articles: &'a [Article],
        view_mode: ViewMode,
        banner: Option<Banner<'a>>,
    },
    /// Failure with no content to fall back on; offers a retry.
    FullScreenError { message: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner<'a> {
    Refreshing,
    /// Dismissible error shown above existing content.
    Error(&'a str),
}

impl FeedViewState {
    pub fn articles(&self) -> &[Article] {
        match self {
            FeedViewState::Initial => &[],
            FeedViewState::Loading { articles, .. }
            | FeedViewState::Success { articles, .. }
            | FeedViewState::Error { articles, .. } => articles,
        }
    }

    /// Current view mode; `List` when nothing has been loaded.
    pub fn view_mode(&self) -> ViewMode {
        match self {
            FeedViewState::Initial => ViewMode::default(),
            FeedViewState::Loading { view_mode, .. }
            | FeedViewState::Success { view_mode, .. }
            | FeedViewState::Error { view_mode, .. } => *view_mode,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FeedViewState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FeedViewState::Loading { .. })
    }

    pub fn presentation(&self) -> Presentation<'_> {
        let articles = self.articles();
        let view_mode = self.view_mode();
        match self {
            FeedViewState::Initial => Presentation::Blank,
            FeedViewState::Loading { .. } if articles.is_empty() => Presentation::Spinner,
            FeedViewState::Loading { .. } => Presentation::Content {
                articles,
                view_mode,
                banner: Some(Banner::Refreshing),
            },
            FeedViewState::Success { .. } => Presentation::Content {
                articles,
                view_mode,
                banner: None,
            },
            FeedViewState::Error { message, .. } if articles.is_empty() => {
                Presentation::FullScreenError { message }
            }
            FeedViewState::Error { message, .. } => Presentation::Content {
                articles,
                view_mode,
                banner: Some(Banner::Error(message)),
            },
        }
    }
}
