//! HTTP/WebSocket API for the tournament server.
//!
//! # Modules
//!
//! - [`auth`]: Bearer-token verification and the authentication middleware
//! - [`tournaments`]: Tournament lifecycle and registration endpoints
//! - [`websocket`]: Realtime channel for ready signals, moves and events
//! - [`error`]: Status codes for coordinator errors
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                                    - Health check (public)
//! GET  /ws?passkey=<passkey>                      - WebSocket (passkey)
//! GET  /api/v1/tournaments?status=OPEN            - List tournaments (public)
//! GET  /api/v1/tournaments/{id}                   - Get tournament (public)
//! POST /api/v1/tournaments                        - Create tournament (auth required)
//! GET  /api/v1/tournaments/mine                   - Caller's tournaments (auth required)
//! POST /api/v1/tournaments/{id}/open              - Open registration (auth required)
//! POST /api/v1/tournaments/{id}/start             - Start and pair (auth required)
//! POST /api/v1/tournaments/{id}/complete          - Complete (auth required)
//! POST /api/v1/tournaments/{id}/registrations     - Register (auth required)
//! GET  /api/v1/tournaments/{id}/registration      - Own registration (auth required)
//! GET  /api/v1/registrations/{passkey}            - Registration by passkey (auth required)
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development.

pub mod auth;
pub mod error;
pub mod tournaments;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use duel_coordinator::{Coordinator, db::Database};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::hub::ConnectionHub;
use auth::TokenVerifier;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// - `coordinator`: Every tournament operation
/// - `hub`: Outbound queues of open sockets, the coordinator's transport
/// - `tokens`: Bearer-token verification
/// - `database`: Pool to probe in health checks, `None` for in-memory storage
/// - `outbound_buffer`: Queue size of each new socket
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub hub: Arc<ConnectionHub>,
    pub tokens: Arc<TokenVerifier>,
    pub database: Option<Arc<Database>>,
    pub outbound_buffer: usize,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use dc_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:6969").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    // WebSocket authenticates with its passkey instead of a bearer token
    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament));

    let protected_routes = Router::new()
        .route("/tournaments", post(tournaments::create_tournament))
        .route("/tournaments/mine", get(tournaments::my_tournaments))
        .route(
            "/tournaments/{tournament_id}/open",
            post(tournaments::open_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/start",
            post(tournaments::start_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/complete",
            post(tournaments::complete_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/registrations",
            post(tournaments::register),
        )
        .route(
            "/tournaments/{tournament_id}/registration",
            get(tournaments::get_registration),
        )
        .route(
            "/registrations/{passkey}",
            get(tournaments::get_registration_by_passkey),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            auth::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","storage":"memory","database":null,"connections":0,...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.database {
        Some(db) => Some(db.health_check().await.is_ok()),
        None => None,
    };
    let healthy = database.unwrap_or(true);

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": if state.database.is_some() { "postgres" } else { "memory" },
        "database": database,
        "connections": state.hub.len().await,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
