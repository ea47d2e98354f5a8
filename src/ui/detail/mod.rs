mod intent;
mod reducer;
mod state;
mod view_model;

pub use intent::{DetailEvent, DetailIntent, LookupResult};
pub use reducer::{DetailReducer, LOAD_FAILED_MESSAGE, MISSING_URL_MESSAGE, NOT_FOUND_MESSAGE};
pub use state::DetailViewState;
pub use view_model::DetailViewModel;
