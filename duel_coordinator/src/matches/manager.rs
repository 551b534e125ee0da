//! Match state machine and turn arbitration.

use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

use super::models::{Match, MatchId, MatchStatus};
use crate::db::{MatchCompletion, Store};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::game::{GameMove, GameRegistry, Outcome, Turn};
use crate::notify::{Notifier, ServerEvent};
use crate::registry::PlayerRegistry;
use crate::session::SessionDirectory;
use crate::tournament::TournamentId;

/// What an accepted move did to its match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Match goes on, `next_turn` is to move
    Continued { next_turn: Turn },
    /// Match finished with this winner marker
    Finished { winner: Outcome },
}

/// Match manager
#[derive(Clone)]
pub struct MatchManager {
    store: Arc<dyn Store>,
    games: Arc<GameRegistry>,
    sessions: SessionDirectory,
    notifier: Notifier,
}

impl MatchManager {
    pub fn new(
        store: Arc<dyn Store>,
        games: Arc<GameRegistry>,
        sessions: SessionDirectory,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            games,
            sessions,
            notifier,
        }
    }

    async fn registry(&self, passkey: &str) -> CoordinatorResult<PlayerRegistry> {
        self.store
            .get_registry_by_passkey(passkey)
            .await?
            .ok_or_else(|| CoordinatorError::NotFound("registration for passkey".to_string()))
    }

    /// Apply a move submitted over `connection_id` by the owner of `passkey`.
    ///
    /// Rejections leave the match untouched. A terminal outcome finishes the
    /// match, releases both players and scores them in a single write.
    pub async fn submit_move(
        &self,
        connection_id: &str,
        passkey: &str,
        tournament_id: TournamentId,
        match_id: MatchId,
        mv: &GameMove,
    ) -> CoordinatorResult<MoveOutcome> {
        let m = self
            .store
            .find_match(match_id)
            .await?
            .ok_or_else(|| CoordinatorError::NotFound(format!("match {match_id}")))?;

        if m.tournament_id != tournament_id {
            warn!("Move for match {match_id} routed through tournament {tournament_id}");
            return Err(CoordinatorError::InvalidState(
                "match does not belong to this tournament".to_string(),
            ));
        }
        if m.status != MatchStatus::Ongoing {
            return Err(CoordinatorError::InvalidState(format!(
                "match is {}",
                m.status
            )));
        }
        let side = m.side_of(passkey).ok_or_else(|| {
            CoordinatorError::Forbidden("passkey does not play this match".to_string())
        })?;
        if side != m.next_turn {
            return Err(CoordinatorError::Forbidden("not your turn".to_string()));
        }

        let mover = self.registry(passkey).await?;
        let user_id = self.sessions.user_of(connection_id).await?;
        if mover.player_user_id != user_id {
            warn!("Connection {connection_id} submitted a move with a passkey of another user");
            return Err(CoordinatorError::Forbidden(
                "passkey belongs to another player".to_string(),
            ));
        }

        let tournament = self
            .store
            .get_tournament(tournament_id)
            .await?
            .ok_or_else(|| CoordinatorError::NotFound(format!("tournament {tournament_id}")))?;
        let engine = self
            .games
            .resolve(&tournament.game)
            .ok_or_else(|| CoordinatorError::NotFound(format!("game {}", tournament.game)))?;

        let transition = engine.next(&m.game_state, m.next_turn, mv)?;

        if !transition.outcome.is_terminal() {
            let updated = self
                .store
                .record_move(
                    tournament_id,
                    match_id,
                    m.version,
                    &transition.state,
                    transition.turn,
                )
                .await?;

            let to_move = if updated.next_turn == side {
                mover
            } else {
                self.registry(updated.passkey_of(updated.next_turn)).await?
            };
            self.notifier
                .notify_user(
                    &to_move.player_user_id,
                    &ServerEvent::require_move(updated.view()),
                )
                .await;

            return Ok(MoveOutcome::Continued {
                next_turn: updated.next_turn,
            });
        }

        let finished = self
            .store
            .complete_match(&MatchCompletion {
                tournament_id,
                match_id,
                expected_version: m.version,
                final_state: transition.state,
                final_turn: transition.turn,
                winner: transition.outcome,
            })
            .await?;
        info!(
            "Match {match_id} finished, winner {}",
            finished.winner.as_str()
        );

        self.announce_result(&finished, side, &mover).await?;
        Ok(MoveOutcome::Finished {
            winner: finished.winner,
        })
    }

    /// Push won/lost/draw to both participants of a finished match
    async fn announce_result(
        &self,
        finished: &Match,
        mover_side: Turn,
        mover: &PlayerRegistry,
    ) -> CoordinatorResult<()> {
        let opponent = self
            .registry(finished.passkey_of(mover_side.opponent()))
            .await?;

        for (side, registry) in [(mover_side, mover), (mover_side.opponent(), &opponent)] {
            if let Some(event) = ServerEvent::match_result(finished.winner, side, finished.view())
            {
                self.notifier
                    .notify_user(&registry.player_user_id, &event)
                    .await;
            }
        }
        Ok(())
    }
}
