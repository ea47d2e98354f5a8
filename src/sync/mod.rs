//! Stale-while-revalidate synchronization between the cache and the remote
//! source.
//!
//! # Cycle
//!
//! ```text
//! observe cache ──→ should fetch? ──no──→ Success(snapshot) ──→ follow cache
//!                        │
//!                       yes
//!                        ↓
//!              Loading(snapshot) ──→ fetch ──ok──→ replace_all ──→ Success(re-read)
//!                                      │                                  │
//!                                    error ──→ Failed(snapshot, message)  │
//!                                                         │               │
//!                                                         └──→ follow cache (Success per write)
//! ```
//!
//! A cycle lives until its [`SyncStream`] is dropped or cancelled.

mod outcome;
mod synchronizer;

pub use outcome::{FetchOutcome, CONNECTIVITY_MESSAGE, UNEXPECTED_MESSAGE};
pub use synchronizer::{failure_message, FetchPolicy, ResourceSynchronizer, ShouldFetch, SyncStream};
