//! Tournament lifecycle manager.

use log::{info, warn};
use std::sync::Arc;

use super::models::{Tournament, TournamentConfig, TournamentId, TournamentStatus};
use crate::db::Store;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::game::GameRegistry;

/// Fewest ready players a tournament can start with
pub const MIN_READY_PLAYERS: usize = 2;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    store: Arc<dyn Store>,
    games: Arc<GameRegistry>,
}

impl TournamentManager {
    pub fn new(store: Arc<dyn Store>, games: Arc<GameRegistry>) -> Self {
        Self { store, games }
    }

    /// Create a tournament pinned to a registered game
    pub async fn create(
        &self,
        creator_id: &str,
        config: TournamentConfig,
    ) -> CoordinatorResult<Tournament> {
        if self.games.resolve(&config.game).is_none() {
            return Err(CoordinatorError::NotFound(format!("game {}", config.game)));
        }
        if config.rounds == 0 {
            return Err(CoordinatorError::InvalidState(
                "a tournament needs at least one round".to_string(),
            ));
        }

        let tournament = Tournament::new(creator_id, config);
        self.store.insert_tournament(&tournament).await?;

        info!(
            "Created tournament {} ({}) for {}",
            tournament.tournament_id, tournament.game, creator_id
        );
        Ok(tournament)
    }

    pub async fn get(&self, tournament_id: TournamentId) -> CoordinatorResult<Tournament> {
        self.store
            .get_tournament(tournament_id)
            .await?
            .ok_or_else(|| CoordinatorError::NotFound(format!("tournament {tournament_id}")))
    }

    pub async fn list_by_status(
        &self,
        status: TournamentStatus,
    ) -> CoordinatorResult<Vec<Tournament>> {
        self.store.list_tournaments_by_status(status).await
    }

    pub async fn list_by_creator(&self, creator_id: &str) -> CoordinatorResult<Vec<Tournament>> {
        self.store.list_tournaments_by_creator(creator_id).await
    }

    /// CREATED -> OPEN, creator only
    pub async fn open(
        &self,
        tournament_id: TournamentId,
        requester_id: &str,
    ) -> CoordinatorResult<Tournament> {
        self.advance(
            tournament_id,
            requester_id,
            TournamentStatus::Created,
            TournamentStatus::Open,
        )
        .await
    }

    /// The tournament, if `requester_id` may start it now.
    ///
    /// Only the creator can start an OPEN tournament. The status change itself
    /// is written by the matchmaking engine together with the first round.
    pub async fn startable(
        &self,
        tournament_id: TournamentId,
        requester_id: &str,
    ) -> CoordinatorResult<Tournament> {
        let tournament = self.get(tournament_id).await?;
        Self::check_phase(&tournament, requester_id, TournamentStatus::Open)?;
        Ok(tournament)
    }

    /// STARTED -> COMPLETED, creator only
    pub async fn complete(
        &self,
        tournament_id: TournamentId,
        requester_id: &str,
    ) -> CoordinatorResult<Tournament> {
        self.advance(
            tournament_id,
            requester_id,
            TournamentStatus::Started,
            TournamentStatus::Completed,
        )
        .await
    }

    async fn advance(
        &self,
        tournament_id: TournamentId,
        requester_id: &str,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> CoordinatorResult<Tournament> {
        let tournament = self.get(tournament_id).await?;
        Self::check_phase(&tournament, requester_id, from)?;

        let updated = self
            .store
            .transition_tournament(tournament_id, from, to)
            .await?;
        info!("Tournament {tournament_id}: {from} -> {to}");
        Ok(updated)
    }

    fn check_phase(
        tournament: &Tournament,
        requester_id: &str,
        expected: TournamentStatus,
    ) -> CoordinatorResult<()> {
        if !tournament.is_created_by(requester_id) {
            warn!(
                "User {requester_id} is not the creator of tournament {}",
                tournament.tournament_id
            );
            return Err(CoordinatorError::Forbidden(
                "only the creator can change the tournament status".to_string(),
            ));
        }
        if tournament.status != expected {
            return Err(CoordinatorError::Forbidden(format!(
                "tournament is {}, expected {expected}",
                tournament.status
            )));
        }
        Ok(())
    }
}
