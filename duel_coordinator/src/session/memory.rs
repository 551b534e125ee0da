//! In-memory session store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ConnectionId, SessionEntry, SessionStore, UserId};
use crate::error::CoordinatorResult;

#[derive(Default)]
struct Sessions {
    by_user: HashMap<UserId, SessionEntry>,
    by_connection: HashMap<ConnectionId, UserId>,
}

impl Sessions {
    fn unlink(&mut self, user_id: &str) {
        if let Some(SessionEntry::Online(connection_id)) = self.by_user.get(user_id) {
            self.by_connection.remove(connection_id);
        }
    }
}

/// Session store kept in process memory
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<Sessions>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str) -> CoordinatorResult<Option<SessionEntry>> {
        Ok(self.sessions.read().await.by_user.get(user_id).cloned())
    }

    async fn set(&self, user_id: &str, entry: SessionEntry) -> CoordinatorResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.unlink(user_id);
        if let SessionEntry::Online(connection_id) = &entry {
            sessions
                .by_connection
                .insert(connection_id.clone(), user_id.to_string());
        }
        sessions.by_user.insert(user_id.to_string(), entry);
        Ok(())
    }

    async fn user_for_connection(&self, connection_id: &str) -> CoordinatorResult<Option<UserId>> {
        Ok(self
            .sessions
            .read()
            .await
            .by_connection
            .get(connection_id)
            .cloned())
    }
}
