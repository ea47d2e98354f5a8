//! Offline-first news feed core.
//!
//! ```text
//! submit(intent) ──→ IntentQueue ──→ worker ──→ Reducer ──→ ViewStateStream ──→ UI
//!                                      │   ↑
//!                          Load/Refresh│   │FetchOutcome
//!                                      ↓   │
//!                               ResourceSynchronizer
//!                                 │             │
//!                            CacheStore    RemoteSource
//! ```
//!
//! The cache is what the UI observes; the network only ever updates the
//! cache.

pub mod cache;
pub mod cancel;
pub mod config;
pub mod logging;
pub mod model;
pub mod remote;
pub mod sync;
pub mod ui;
