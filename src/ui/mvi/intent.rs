//! Base trait for intents (user/system actions).

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions (load, refresh, toggle, dismiss)
/// - System events (fetch outcomes, cache lookups)
///
/// Intents are processed by reducers to produce new states.
pub trait Intent: Send + 'static {}
