//! Coordinator error types.

use thiserror::Error;

use crate::game::GameError;

/// Errors reported by every coordinator operation
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Referenced tournament, registry, match or session is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identity, ownership or phase precondition failed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Start attempted without enough ready players
    #[error("Insufficient players: need {needed}, have {current}")]
    InsufficientPlayers { needed: usize, current: usize },

    /// Optimistic-concurrency precondition failed on a write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Structurally inconsistent request
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Game engine could not interpret a stored state
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoordinatorError {
    /// Get a client-safe error message that doesn't leak storage internals
    pub fn client_message(&self) -> String {
        match self {
            CoordinatorError::Database(_) => "Internal server error".to_string(),
            CoordinatorError::Serialization(_) | CoordinatorError::Game(_) => {
                "Corrupted game data".to_string()
            }
            _ => self.to_string(),
        }
    }

    pub(crate) fn conflict(what: impl Into<String>) -> Self {
        CoordinatorError::Conflict(what.into())
    }
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_database_details() {
        let err = CoordinatorError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_client_message_keeps_domain_errors() {
        let err = CoordinatorError::InsufficientPlayers {
            needed: 2,
            current: 1,
        };
        assert_eq!(err.client_message(), "Insufficient players: need 2, have 1");
    }
}
