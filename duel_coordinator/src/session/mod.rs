//! Session directory: which live connection, if any, reaches each user.
//!
//! The directory is a narrow service over an injectable [`SessionStore`]. An
//! entry explicitly marked [`SessionEntry::Offline`] means the user was connected
//! before and has since dropped, which is different from never having connected.

pub mod memory;
pub mod postgres;

pub use memory::InMemorySessionStore;
pub use postgres::PgSessionStore;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::error::{CoordinatorError, CoordinatorResult};

/// Account identity, resolved upstream
pub type UserId = String;

/// Transport-level handle of a live connection
pub type ConnectionId = String;

/// Sentinel stored in place of a connection id for offline users
pub const OFFLINE_CONNECTION_ID: &str = "offline";

/// Connection state of a known user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEntry {
    Online(ConnectionId),
    Offline,
}

impl SessionEntry {
    /// Live connection, if online
    pub fn connection(&self) -> Option<&str> {
        match self {
            SessionEntry::Online(connection_id) => Some(connection_id),
            SessionEntry::Offline => None,
        }
    }
}

/// Backing store of the session directory
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current entry for a user
    async fn get(&self, user_id: &str) -> CoordinatorResult<Option<SessionEntry>>;

    /// Set a user's entry, replacing any previous one
    async fn set(&self, user_id: &str, entry: SessionEntry) -> CoordinatorResult<()>;

    /// Reverse lookup from a live connection to its user
    async fn user_for_connection(&self, connection_id: &str) -> CoordinatorResult<Option<UserId>>;
}

/// Session directory service
#[derive(Clone)]
pub struct SessionDirectory {
    store: Arc<dyn SessionStore>,
}

impl SessionDirectory {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Directory backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemorySessionStore::new()))
    }

    /// Bind a user to a live connection
    pub async fn connect(&self, user_id: &str, connection_id: &str) -> CoordinatorResult<()> {
        self.store
            .set(user_id, SessionEntry::Online(connection_id.to_string()))
            .await?;
        info!("Session bound: user={user_id}, connection={connection_id}");
        Ok(())
    }

    /// Mark the user behind a connection offline and return that user
    pub async fn disconnect(&self, connection_id: &str) -> CoordinatorResult<UserId> {
        let user_id = self.user_of(connection_id).await?;
        self.store.set(&user_id, SessionEntry::Offline).await?;
        info!("Session offline: user={user_id}, connection={connection_id}");
        Ok(user_id)
    }

    /// User bound to a connection
    pub async fn user_of(&self, connection_id: &str) -> CoordinatorResult<UserId> {
        self.store
            .user_for_connection(connection_id)
            .await?
            .ok_or_else(|| CoordinatorError::NotFound(format!("connection {connection_id}")))
    }

    /// Live connection of a user, `None` when offline or never connected
    pub async fn connection_of(&self, user_id: &str) -> CoordinatorResult<Option<ConnectionId>> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .and_then(|entry| entry.connection().map(str::to_string)))
    }

    /// Raw entry of a user
    pub async fn entry(&self, user_id: &str) -> CoordinatorResult<Option<SessionEntry>> {
        self.store.get(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_reverse_lookup() {
        let sessions = SessionDirectory::in_memory();
        sessions.connect("alice", "conn-1").await.unwrap();

        assert_eq!(sessions.user_of("conn-1").await.unwrap(), "alice");
        assert_eq!(
            sessions.connection_of("alice").await.unwrap().as_deref(),
            Some("conn-1")
        );
    }

    #[tokio::test]
    async fn test_offline_differs_from_absent() {
        let sessions = SessionDirectory::in_memory();
        sessions.connect("alice", "conn-1").await.unwrap();

        let user = sessions.disconnect("conn-1").await.unwrap();
        assert_eq!(user, "alice");
        assert_eq!(
            sessions.entry("alice").await.unwrap(),
            Some(SessionEntry::Offline)
        );
        assert_eq!(sessions.entry("bob").await.unwrap(), None);
        assert_eq!(sessions.connection_of("alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reconnect_replaces_old_connection() {
        let sessions = SessionDirectory::in_memory();
        sessions.connect("alice", "conn-1").await.unwrap();
        sessions.connect("alice", "conn-2").await.unwrap();

        assert!(matches!(
            sessions.user_of("conn-1").await,
            Err(CoordinatorError::NotFound(_))
        ));
        assert_eq!(sessions.user_of("conn-2").await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_disconnect_unknown_connection() {
        let sessions = SessionDirectory::in_memory();
        assert!(matches!(
            sessions.disconnect("ghost").await,
            Err(CoordinatorError::NotFound(_))
        ));
    }
}
