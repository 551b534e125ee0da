//! Bearer-token identity for protected endpoints.
//!
//! Users are authenticated elsewhere; this server only verifies HS256 tokens
//! and trusts their `sub` claim as the user id.
//!
//! # Extracting User ID
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use duel_coordinator::UserId;
//!
//! async fn protected_handler(Extension(user_id): Extension<UserId>) -> String {
//!     format!("Authenticated as user {}", user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use duel_coordinator::UserId;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::logging::log_security_event;

/// Access token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: UserId,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Signs and verifies access tokens with a shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    jwt_secret: String,
}

impl TokenVerifier {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Verify signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Mint a token for `user_id`, valid for `ttl`
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
    }
}

/// Authentication middleware that validates bearer tokens and injects the
/// user ID into request extensions.
///
/// - **Success**: Injects `UserId` → Calls next handler
/// - **Missing header / invalid format**: Returns `401 Unauthorized`
/// - **Invalid/expired token**: Returns `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    match state.tokens.verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert::<UserId>(claims.sub);
            Ok(next.run(request).await)
        }
        Err(e) => {
            log_security_event("invalid_token", None, &e.to_string());
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenVerifier::new("x".repeat(32));
        let token = tokens.issue("alice", Duration::minutes(15)).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenVerifier::new("x".repeat(32))
            .issue("alice", Duration::minutes(15))
            .unwrap();
        assert!(TokenVerifier::new("y".repeat(32)).verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenVerifier::new("x".repeat(32));
        let token = tokens.issue("alice", Duration::hours(-2)).unwrap();
        assert!(tokens.verify(&token).is_err());
    }
}
