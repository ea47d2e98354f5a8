use crate::model::Article;

/// Shown when the remote source could not be reached.
pub const CONNECTIVITY_MESSAGE: &str =
    "Failed to get headlines, please check your internet connection";

/// Shown for failures that carry no user-presentable message.
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// One step of a synchronization cycle.
///
/// Every variant carries the last-known-good snapshot, so a failure never
/// forces the consumer to drop content it already shows.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loading(Vec<Article>),
    Success(Vec<Article>),
    Failed { data: Vec<Article>, message: String },
}

impl FetchOutcome {
    pub fn data(&self) -> &[Article] {
        match self {
            FetchOutcome::Loading(data) | FetchOutcome::Success(data) => data,
            FetchOutcome::Failed { data, .. } => data,
        }
    }

    /// Whether the remote step of the cycle has finished.
    pub fn is_settled(&self) -> bool {
        !matches!(self, FetchOutcome::Loading(_))
    }
}
