mod intent;
mod reducer;
mod state;
mod view_model;

pub use intent::{FeedEvent, FeedIntent};
pub use reducer::FeedReducer;
pub use state::{Banner, FeedViewState, Presentation, ViewMode};
pub use view_model::FeedViewModel;
