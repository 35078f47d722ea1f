//! API route definitions.

use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::ws::ws_handler;

use super::handlers;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let cors = build_cors_layer(cors_origins);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let api_routes = Router::new()
        .route("/ws", get(ws_handler))
        .route("/stats", get(handlers::stats))
        .route("/notifications", post(handlers::send_notification))
        .route("/broadcast", post(handlers::broadcast));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
