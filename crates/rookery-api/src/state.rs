//! Shared application state.

use crate::lifecycle::ConnectionLifecycle;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the hosted game room.
    pub lifecycle: ConnectionLifecycle,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(lifecycle: ConnectionLifecycle) -> Self {
        Self { lifecycle }
    }
}
