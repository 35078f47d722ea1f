//! HTTP surface: producer endpoints, ops endpoints, and the WebSocket
//! upgrade route.

mod error;
mod handlers;
mod routes;
pub(crate) mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
