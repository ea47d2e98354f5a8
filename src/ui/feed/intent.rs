//! Intents for the headline feed.

use crate::sync::FetchOutcome;
use crate::ui::mvi::Intent;

/// Actions the UI can request on the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedIntent {
    /// Open a sync cycle under the configured fetch policy.
    Load,
    /// Open a sync cycle that always fetches.
    Refresh,
    ToggleViewMode,
    /// Dismiss the current error.
    ClearError,
}

/// Everything the feed reducer consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Intent(FeedIntent),
    Outcome(FetchOutcome),
}

impl Intent for FeedEvent {}

impl From<FeedIntent> for FeedEvent {
    fn from(intent: FeedIntent) -> Self {
        FeedEvent::Intent(intent)
    }
}

impl From<FetchOutcome> for FeedEvent {
    fn from(outcome: FetchOutcome) -> Self {
        FeedEvent::Outcome(outcome)
    }
}
