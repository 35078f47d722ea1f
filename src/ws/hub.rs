//! Notification hub: connection registry and delivery router.
//!
//! All membership and routing decisions run on a single coordination task
//! that owns the registry outright. Producers, the upgrade handler, and the
//! per-connection drain loops interact with it only through commands on an
//! unbounded channel, so a send never blocks the caller and the registry
//! never sees concurrent mutation.

use std::collections::HashMap;

use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::connection::Connection;
use super::types::Notification;

/// Point-in-time view of hub membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    /// Total live connections across all users.
    pub connected_clients: usize,
    /// Distinct users with at least one live connection.
    pub connected_users: usize,
}

enum Command {
    Register(Connection),
    Unregister { user_id: String, conn_id: Uuid },
    SendToUser { user_id: String, notification: Notification },
    Broadcast { notification: Notification },
    Stats { reply: oneshot::Sender<HubStats> },
}

/// Handle to the hub's coordination task. Cheap to clone; constructed once
/// at startup and passed to everything that registers connections or sends
/// notifications.
#[derive(Clone)]
pub struct Hub {
    tx: mpsc::UnboundedSender<Command>,
}

impl Hub {
    /// Create a hub and spawn its coordination task. The task runs until the
    /// last handle is dropped.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(Registry::default().run(rx));
        Self { tx }
    }

    /// Register a connection under its user's identity. Construct once,
    /// register once; a reconnect gets a fresh `Connection`.
    pub fn register(&self, connection: Connection) {
        let _ = self.tx.send(Command::Register(connection));
    }

    /// Remove a connection if it is still registered. Dropping it from the
    /// registry closes its outbound queue, which stops the drain loop after
    /// remaining items are written. Redundant calls are no-ops: the write
    /// path, the read path, and overflow eviction may all race to tear down
    /// the same connection.
    pub fn unregister(&self, user_id: &str, conn_id: Uuid) {
        let _ = self.tx.send(Command::Unregister {
            user_id: user_id.to_string(),
            conn_id,
        });
    }

    /// Deliver a notification to every live connection of `user_id`,
    /// stamping the target identity and creation time. No live connections
    /// means the payload is silently dropped; a full or closed outbound
    /// queue means that one connection is evicted. Fire-and-forget: the
    /// caller never blocks and never observes delivery outcome.
    pub fn send_to_user(&self, user_id: &str, notification: Notification) {
        let _ = self.tx.send(Command::SendToUser {
            user_id: user_id.to_string(),
            notification,
        });
    }

    /// Deliver a notification to every live connection of every user, with
    /// the same per-connection drop-and-evict policy as `send_to_user`.
    pub fn broadcast_to_all(&self, notification: Notification) {
        let _ = self.tx.send(Command::Broadcast { notification });
    }

    /// Snapshot of current membership. Because the coordination task handles
    /// commands in order, the snapshot reflects every command sent through
    /// this handle before the call.
    pub async fn stats(&self) -> HubStats {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Stats { reply }).is_err() {
            return HubStats::default();
        }
        rx.await.unwrap_or_default()
    }

    /// Total live connections.
    pub async fn connection_count(&self) -> usize {
        self.stats().await.connected_clients
    }

    /// Distinct users with at least one live connection.
    pub async fn user_count(&self) -> usize {
        self.stats().await.connected_users
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry state, owned exclusively by the coordination task.
#[derive(Default)]
struct Registry {
    /// User id -> that user's live connections, keyed by connection id.
    users: HashMap<String, HashMap<Uuid, Connection>>,
}

impl Registry {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd);
        }
        debug!("hub coordination task stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Register(connection) => self.register(connection),
            Command::Unregister { user_id, conn_id } => self.unregister(&user_id, conn_id),
            Command::SendToUser {
                user_id,
                mut notification,
            } => {
                notification.target = Some(user_id.clone());
                notification.created_at = Some(Utc::now());
                self.deliver(&user_id, &notification);
            }
            Command::Broadcast { mut notification } => {
                notification.created_at = Some(Utc::now());
                self.broadcast(&notification);
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    fn register(&mut self, connection: Connection) {
        let user_id = connection.user_id().to_string();
        let conn_id = connection.id();
        self.users
            .entry(user_id.clone())
            .or_default()
            .insert(conn_id, connection);
        info!("registered connection {conn_id} for user {user_id}");
    }

    fn unregister(&mut self, user_id: &str, conn_id: Uuid) {
        let Some(connections) = self.users.get_mut(user_id) else {
            return;
        };
        if connections.remove(&conn_id).is_some() {
            info!("unregistered connection {conn_id} for user {user_id}");
        }
        if connections.is_empty() {
            self.users.remove(user_id);
        }
    }

    fn deliver(&mut self, user_id: &str, notification: &Notification) {
        let Some(connections) = self.users.get(user_id) else {
            debug!("no live connections for user {user_id}, dropping notification");
            return;
        };

        let stale: Vec<Uuid> = connections
            .values()
            .filter_map(|conn| match conn.enqueue(notification.clone()) {
                Ok(()) => None,
                Err(err) => {
                    warn!(
                        "evicting connection {} for user {user_id}: {err}",
                        conn.id()
                    );
                    Some(conn.id())
                }
            })
            .collect();

        for conn_id in stale {
            self.unregister(user_id, conn_id);
        }
    }

    fn broadcast(&mut self, notification: &Notification) {
        let stale: Vec<(String, Uuid)> = self
            .users
            .iter()
            .flat_map(|(user_id, connections)| {
                connections.values().filter_map(move |conn| {
                    match conn.enqueue(notification.clone()) {
                        Ok(()) => None,
                        Err(err) => {
                            warn!(
                                "evicting connection {} for user {user_id}: {err}",
                                conn.id()
                            );
                            Some((user_id.clone(), conn.id()))
                        }
                    }
                })
            })
            .collect();

        for (user_id, conn_id) in stale {
            self.unregister(&user_id, conn_id);
        }
    }

    fn stats(&self) -> HubStats {
        HubStats {
            connected_clients: self.users.values().map(HashMap::len).sum(),
            connected_users: self.users.len(),
        }
    }
}
