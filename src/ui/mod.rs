//! View layer: intent queues, reducers and view state streams.

pub mod detail;
pub mod feed;
pub mod mvi;
pub mod queue;
pub mod view_state;
