//! Application state shared across handlers.

use crate::ws::Hub;

/// Application state shared across all handlers.
///
/// The hub handle is injected at construction; nothing in the crate reaches
/// it through globals.
#[derive(Clone)]
pub struct AppState {
    /// Notification hub for real-time delivery.
    pub hub: Hub,
}

impl AppState {
    /// Create new application state with its own hub.
    pub fn new() -> Self {
        Self { hub: Hub::new() }
    }

    /// Create application state around an existing hub handle.
    pub fn with_hub(hub: Hub) -> Self {
        Self { hub }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
