//! A single client connection and its bounded outbound queue.

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::Notification;

/// Capacity of the per-connection outbound queue. A client that falls this
/// far behind is treated as unresponsive and evicted.
pub const OUTBOUND_QUEUE_SIZE: usize = 256;

/// Why a non-blocking enqueue did not deliver.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    #[error("outbound queue is full")]
    Full,
    #[error("outbound queue is closed")]
    Closed,
}

/// One live duplex session belonging to one authenticated user.
///
/// The `Connection` value is the sender half of the outbound queue and is
/// owned by the hub registry after registration; the receiver half is owned
/// by the connection's outbound drain loop. Dropping the `Connection` (on
/// unregister) closes the queue, which stops the drain loop once remaining
/// items are written out.
#[derive(Debug)]
pub struct Connection {
    id: Uuid,
    user_id: String,
    tx: mpsc::Sender<Notification>,
}

impl Connection {
    /// Open a connection for `user_id`, returning the registry half and the
    /// receiver the outbound drain loop pops from.
    pub fn open(user_id: impl Into<String>) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        let conn = Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            tx,
        };
        (conn, rx)
    }

    /// Unique id of this connection. A user may hold several connections
    /// (tabs, devices); each gets its own id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The authenticated identity this connection belongs to. Immutable.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Non-blocking push onto the outbound queue. Called only by the hub;
    /// a failure is the hub's signal to evict this connection.
    pub(crate) fn enqueue(&self, notification: Notification) -> Result<(), EnqueueError> {
        self.tx.try_send(notification).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => EnqueueError::Full,
            mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }
}
