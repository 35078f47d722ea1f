//! Test utilities and common setup.

use axum::Router;
use jobpulse::api::{create_router, AppState};
use jobpulse::ws::Hub;

/// Create a test application with its own hub.
#[allow(dead_code)]
pub fn test_app() -> Router {
    create_router(AppState::new(), &[])
}

/// Create a test application and keep a handle to its hub so tests can
/// register connections and inspect membership.
#[allow(dead_code)]
pub fn test_app_with_hub() -> (Router, Hub) {
    let hub = Hub::new();
    let app = create_router(AppState::with_hub(hub.clone()), &[]);
    (app, hub)
}
