//! Tournament and registration REST handlers.
//!
//! Listing and reading tournaments is public; everything else runs as the
//! user named by the bearer token.
//!
//! # Examples
//!
//! Create a tournament:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"title": "Friday Cup", "gameId": "tictactoe@0.0.1"}'
//! ```
//!
//! Register for it and receive a passkey:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments/$ID/registrations \
//!   -H "Authorization: Bearer TOKEN"
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use duel_coordinator::{
    GameRef, PlayerRegistry, StartedTournament, Tournament, TournamentConfig, TournamentId,
    TournamentStatus, UserId,
};
use serde::Deserialize;

use super::{AppState, error::ApiError};
use crate::metrics;

const MIN_TITLE_LEN: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentRequest {
    pub title: String,
    pub game_id: String,
    pub rounds: Option<u32>,
}

impl CreateTournamentRequest {
    fn into_config(self) -> Result<TournamentConfig, ApiError> {
        let title = self.title.trim();
        if title.chars().count() < MIN_TITLE_LEN {
            return Err(ApiError::BadRequest(format!(
                "title must be at least {MIN_TITLE_LEN} characters"
            )));
        }

        let game: GameRef = self
            .game_id
            .parse::<GameRef>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let config = TournamentConfig::new(title, game);
        Ok(match self.rounds {
            Some(rounds) => config.with_rounds(rounds),
            None => config,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// List tournaments in one status, newest first.
///
/// `GET /api/v1/tournaments?status=OPEN` (status defaults to `OPEN`)
///
/// # Errors
///
/// - `400 Bad Request`: Unknown status
pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    let status = match query.status {
        Some(status) => status.parse().map_err(ApiError::BadRequest)?,
        None => TournamentStatus::Open,
    };

    Ok(Json(state.coordinator.list_tournaments(status).await?))
}

/// Create a tournament owned by the caller.
///
/// Returns `201 Created` with the tournament in `CREATED` status.
///
/// # Errors
///
/// - `400 Bad Request`: Title too short, malformed game id or zero rounds
/// - `404 Not Found`: No engine for the game id
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(request): Json<CreateTournamentRequest>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    let config = request.into_config()?;
    let tournament = state.coordinator.create_tournament(&user_id, config).await?;

    tracing::info!(
        tournament_id = %tournament.tournament_id,
        creator = %user_id,
        "Tournament created"
    );
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// Tournaments created by the caller, newest first.
pub async fn my_tournaments(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    Ok(Json(
        state.coordinator.list_tournaments_by_creator(&user_id).await?,
    ))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    Ok(Json(state.coordinator.get_tournament(tournament_id).await?))
}

/// `CREATED -> OPEN`, creator only.
pub async fn open_tournament(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    Ok(Json(
        state
            .coordinator
            .open_tournament(tournament_id, &user_id)
            .await?,
    ))
}

/// `OPEN -> STARTED` and pair the ready players, creator only.
///
/// # Errors
///
/// - `403 Forbidden`: Not the creator, or the tournament is not open
/// - `409 Conflict`: Fewer than two ready players
pub async fn start_tournament(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<StartedTournament>, ApiError> {
    let started = state
        .coordinator
        .start_tournament(tournament_id, &user_id)
        .await?;

    metrics::matches_created(started.scheduled_matches + started.waiting_matches);
    Ok(Json(started))
}

/// `STARTED -> COMPLETED`, creator only.
pub async fn complete_tournament(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    Ok(Json(
        state
            .coordinator
            .complete_tournament(tournament_id, &user_id)
            .await?,
    ))
}

/// Register the caller and hand out their passkey.
///
/// # Errors
///
/// - `403 Forbidden`: Tournament already started or completed
/// - `409 Conflict`: Caller is already registered
pub async fn register(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<(StatusCode, Json<PlayerRegistry>), ApiError> {
    let registry = state
        .coordinator
        .register_player(tournament_id, &user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(registry)))
}

/// The caller's own registration in a tournament.
pub async fn get_registration(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<PlayerRegistry>, ApiError> {
    Ok(Json(
        state
            .coordinator
            .get_registry(tournament_id, &user_id)
            .await?,
    ))
}

/// Registration behind a passkey, visible to its owner only.
pub async fn get_registration_by_passkey(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(passkey): Path<String>,
) -> Result<Json<PlayerRegistry>, ApiError> {
    Ok(Json(
        state
            .coordinator
            .get_registry_by_passkey(&passkey, &user_id)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, game_id: &str) -> CreateTournamentRequest {
        CreateTournamentRequest {
            title: title.to_string(),
            game_id: game_id.to_string(),
            rounds: None,
        }
    }

    #[test]
    fn test_short_title_is_rejected() {
        assert!(matches!(
            request(" ab ", "tictactoe@0.0.1").into_config(),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_malformed_game_id_is_rejected() {
        assert!(request("Cup", "tictactoe").into_config().is_err());
    }

    #[test]
    fn test_rounds_default_to_one() {
        let config = request("Cup", "tictactoe@0.0.1").into_config().unwrap();
        assert_eq!(config.rounds, 1);
        assert_eq!(config.title, "Cup");
    }
}
