//! Live WebSocket connections, addressed by connection id.
//!
//! Each socket owns a bounded outbound queue drained by its send task. The
//! hub is the coordinator's [`Transport`]: a push never waits on a slow
//! client, it fails when the queue is full.

use async_trait::async_trait;
use duel_coordinator::{ConnectionId, DeliveryError, Transport};
use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};

use crate::metrics;

/// Outbound queues of every open socket
#[derive(Default)]
pub struct ConnectionHub {
    senders: RwLock<HashMap<ConnectionId, mpsc::Sender<String>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a socket's outbound queue, returns the open connection count
    pub async fn register(&self, connection_id: &str, sender: mpsc::Sender<String>) -> usize {
        let mut senders = self.senders.write().await;
        senders.insert(connection_id.to_string(), sender);
        senders.len()
    }

    /// Detach a socket, returns the open connection count
    pub async fn unregister(&self, connection_id: &str) -> usize {
        let mut senders = self.senders.write().await;
        senders.remove(connection_id);
        senders.len()
    }

    pub async fn len(&self) -> usize {
        self.senders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.senders.read().await.is_empty()
    }
}

#[async_trait]
impl Transport for ConnectionHub {
    async fn push(&self, connection_id: &str, frame: String) -> Result<(), DeliveryError> {
        let sender = self.senders.read().await.get(connection_id).cloned();
        let Some(sender) = sender else {
            metrics::notifications_dropped();
            return Err(DeliveryError::Unreachable(format!(
                "connection {connection_id} is not open"
            )));
        };

        sender.try_send(frame).map_err(|e| {
            metrics::notifications_dropped();
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "outbound buffer full",
                mpsc::error::TrySendError::Closed(_) => "socket closed",
            };
            DeliveryError::Unreachable(format!("connection {connection_id}: {reason}"))
        })
    }
}
