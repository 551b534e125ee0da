//! Session-addressed delivery of [`ServerEvent`]s.

use async_trait::async_trait;
use log::{debug, warn};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::Mutex;

use super::events::ServerEvent;
use crate::session::{ConnectionId, SessionDirectory};

/// Why a push did not reach its recipient
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Recipient has no live session
    #[error("recipient is offline")]
    Offline,

    /// The transport could not hand the frame to the connection
    #[error("connection unreachable: {0}")]
    Unreachable(String),

    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Wire transport reaching a live connection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand one serialized frame to a connection
    async fn push(&self, connection_id: &str, frame: String) -> Result<(), DeliveryError>;
}

/// Realtime notifier.
///
/// Delivery is at most once: failures are returned by the `send_*` methods and
/// swallowed with a warning by [`Notifier::notify_user`]. Nothing is retried.
#[derive(Clone)]
pub struct Notifier {
    sessions: SessionDirectory,
    transport: Arc<dyn Transport>,
}

impl Notifier {
    pub fn new(sessions: SessionDirectory, transport: Arc<dyn Transport>) -> Self {
        Self {
            sessions,
            transport,
        }
    }

    pub fn sessions(&self) -> &SessionDirectory {
        &self.sessions
    }

    /// Push to whichever connection the user is bound to
    pub async fn send_to_user(&self, user_id: &str, event: &ServerEvent) -> Result<(), DeliveryError> {
        let connection_id = self
            .sessions
            .connection_of(user_id)
            .await
            .map_err(|e| DeliveryError::Unreachable(e.to_string()))?
            .ok_or(DeliveryError::Offline)?;

        self.send_to_connection(&connection_id, event).await
    }

    /// Push to a specific connection
    pub async fn send_to_connection(
        &self,
        connection_id: &str,
        event: &ServerEvent,
    ) -> Result<(), DeliveryError> {
        let frame = serde_json::to_string(event)?;
        self.transport.push(connection_id, frame).await?;
        debug!("Pushed {} to connection {connection_id}", event.kind());
        Ok(())
    }

    /// Fire-and-forget push; returns whether the event was delivered
    pub async fn notify_user(&self, user_id: &str, event: &ServerEvent) -> bool {
        match self.send_to_user(user_id, event).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropped {} for user {user_id}: {e}", event.kind());
                false
            }
        }
    }
}

/// Transport that keeps every frame in memory, per connection.
///
/// Connections must be opened before they can receive; pushing to an unknown or
/// closed connection fails with [`DeliveryError::Unreachable`].
#[derive(Default)]
pub struct MemoryTransport {
    inboxes: Mutex<HashMap<ConnectionId, Vec<String>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, connection_id: &str) {
        self.inboxes
            .lock()
            .await
            .entry(connection_id.to_string())
            .or_default();
    }

    pub async fn close(&self, connection_id: &str) {
        self.inboxes.lock().await.remove(connection_id);
    }

    /// Take every frame delivered to a connection so far
    pub async fn drain(&self, connection_id: &str) -> Vec<String> {
        self.inboxes
            .lock()
            .await
            .get_mut(connection_id)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Take and decode every event delivered to a connection so far
    pub async fn drain_events(&self, connection_id: &str) -> Vec<ServerEvent> {
        self.drain(connection_id)
            .await
            .iter()
            .filter_map(|frame| serde_json::from_str(frame).ok())
            .collect()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn push(&self, connection_id: &str, frame: String) -> Result<(), DeliveryError> {
        match self.inboxes.lock().await.get_mut(connection_id) {
            Some(inbox) => {
                inbox.push(frame);
                Ok(())
            }
            None => Err(DeliveryError::Unreachable(connection_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameRef;
    use crate::tournament::{Tournament, TournamentConfig};

    fn started() -> ServerEvent {
        ServerEvent::tournament_started(Tournament::new(
            "host",
            TournamentConfig::new("Cup", GameRef::new("tictactoe", "0.0.1")),
        ))
    }

    async fn setup() -> (Notifier, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let notifier = Notifier::new(SessionDirectory::in_memory(), transport.clone());
        (notifier, transport)
    }

    #[tokio::test]
    async fn test_send_to_online_user() {
        let (notifier, transport) = setup().await;
        transport.open("conn-1").await;
        notifier.sessions().connect("alice", "conn-1").await.unwrap();

        notifier.send_to_user("alice", &started()).await.unwrap();

        let events = transport.drain_events("conn-1").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "tournament:started");
    }

    #[tokio::test]
    async fn test_offline_user_is_not_retried() {
        let (notifier, transport) = setup().await;
        transport.open("conn-1").await;
        notifier.sessions().connect("alice", "conn-1").await.unwrap();
        notifier.sessions().disconnect("conn-1").await.unwrap();

        assert!(matches!(
            notifier.send_to_user("alice", &started()).await,
            Err(DeliveryError::Offline)
        ));
        assert!(!notifier.notify_user("alice", &started()).await);
        assert!(!notifier.notify_user("never-connected", &started()).await);
        assert!(transport.drain("conn-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_closed_connection_is_unreachable() {
        let (notifier, transport) = setup().await;
        notifier.sessions().connect("alice", "conn-1").await.unwrap();

        assert!(matches!(
            notifier.send_to_user("alice", &started()).await,
            Err(DeliveryError::Unreachable(_))
        ));
        assert!(transport.drain("conn-1").await.is_empty());
    }
}
