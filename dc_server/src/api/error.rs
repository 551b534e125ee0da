//! HTTP mapping of coordinator errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use duel_coordinator::CoordinatorError;
use serde_json::json;

/// Error returned by REST handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// Request body or query failed validation
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Coordinator(e) => match e {
                CoordinatorError::NotFound(_) => StatusCode::NOT_FOUND,
                CoordinatorError::Forbidden(_) => StatusCode::FORBIDDEN,
                CoordinatorError::InsufficientPlayers { .. }
                | CoordinatorError::Conflict(_) => StatusCode::CONFLICT,
                CoordinatorError::InvalidState(_) => StatusCode::BAD_REQUEST,
                CoordinatorError::Game(_)
                | CoordinatorError::Database(_)
                | CoordinatorError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message safe to show a client
    pub fn client_message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Coordinator(e) => e.client_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CoordinatorError::NotFound("t".into()), StatusCode::NOT_FOUND),
            (CoordinatorError::Forbidden("t".into()), StatusCode::FORBIDDEN),
            (CoordinatorError::Conflict("t".into()), StatusCode::CONFLICT),
            (
                CoordinatorError::InsufficientPlayers {
                    needed: 2,
                    current: 0,
                },
                StatusCode::CONFLICT,
            ),
            (CoordinatorError::InvalidState("t".into()), StatusCode::BAD_REQUEST),
            (
                CoordinatorError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_database_details_stay_private() {
        let err = ApiError::from(CoordinatorError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.client_message(), "Internal server error");
    }
}
