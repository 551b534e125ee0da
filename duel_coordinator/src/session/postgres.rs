//! PostgreSQL session store.
//!
//! One row per user in `user_sessions`; offline users keep their row with the
//! [`OFFLINE_CONNECTION_ID`] sentinel.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use super::{OFFLINE_CONNECTION_ID, SessionEntry, SessionStore, UserId};
use crate::error::CoordinatorResult;

/// Session store persisted in PostgreSQL
pub struct PgSessionStore {
    pool: Arc<PgPool>,
}

impl PgSessionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn get(&self, user_id: &str) -> CoordinatorResult<Option<SessionEntry>> {
        let row = sqlx::query("SELECT connection_id FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|row| {
            let connection_id: String = row.get("connection_id");
            if connection_id == OFFLINE_CONNECTION_ID {
                SessionEntry::Offline
            } else {
                SessionEntry::Online(connection_id)
            }
        }))
    }

    async fn set(&self, user_id: &str, entry: SessionEntry) -> CoordinatorResult<()> {
        let connection_id = entry.connection().unwrap_or(OFFLINE_CONNECTION_ID);

        sqlx::query(
            r#"
            INSERT INTO user_sessions (user_id, connection_id, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET connection_id = EXCLUDED.connection_id, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(connection_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn user_for_connection(&self, connection_id: &str) -> CoordinatorResult<Option<UserId>> {
        if connection_id == OFFLINE_CONNECTION_ID {
            return Ok(None);
        }

        let row = sqlx::query("SELECT user_id FROM user_sessions WHERE connection_id = $1")
            .bind(connection_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|row| row.get("user_id")))
    }
}
