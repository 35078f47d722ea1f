//! Real-time notification fan-out over WebSocket.
//!
//! ```text
//! request handlers (chat send, notification create, admin broadcast)
//!          │ send_to_user / broadcast_to_all      (fire-and-forget)
//!          ▼
//!       Hub actor ── owns user id -> {connection id -> Connection}
//!          │ non-blocking enqueue, evict on overflow
//!          ▼
//!   per-connection bounded queue ──► outbound drain ──► WebSocket
//!   per-connection inbound drain ◄── WebSocket (liveness/control only)
//! ```
//!
//! Delivery is best-effort and in-memory: persistence of the underlying
//! chat message or notification record happens in the storage service
//! before (and independent of) hub delivery.

mod connection;
mod handler;
mod hub;
mod types;

pub use connection::{Connection, EnqueueError, OUTBOUND_QUEUE_SIZE};
pub use handler::ws_handler;
pub use hub::{Hub, HubStats};
pub use types::{ClientFrame, Notification};
