//! Matchmaking engine: turns the ready set of a started tournament into
//! matches, and activates waiting matches when a player becomes ready later.

use log::{info, warn};
use std::{collections::HashMap, sync::Arc};

use super::pairing::plan_round;
use crate::db::{PairingRound, Store};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::game::{GameRegistry, Turn};
use crate::matches::{Match, MatchStatus};
use crate::notify::{Notifier, ServerEvent};
use crate::registry::{PlayerRegistry, RegistryStatus};
use crate::session::UserId;
use crate::tournament::{MIN_READY_PLAYERS, Tournament};

/// Matchmaking engine
#[derive(Clone)]
pub struct MatchmakingEngine {
    store: Arc<dyn Store>,
    games: Arc<GameRegistry>,
    notifier: Notifier,
}

impl MatchmakingEngine {
    pub fn new(store: Arc<dyn Store>, games: Arc<GameRegistry>, notifier: Notifier) -> Self {
        Self {
            store,
            games,
            notifier,
        }
    }

    /// Start an OPEN tournament by pairing every ready player.
    ///
    /// One match is created per unordered pair of ready players; a greedy,
    /// conflict-free subset starts immediately and the rest are kept WAITING.
    /// The status change and the round are written together, so a ready set
    /// that changes before the write fails with `Conflict` and leaves the
    /// tournament OPEN.
    ///
    /// Paired-in players get `tournament:started`, then player 1 of every
    /// started match gets `match:require_move`.
    pub async fn start_round(
        &self,
        tournament: &Tournament,
    ) -> CoordinatorResult<(Tournament, PairingRound)> {
        let engine = self
            .games
            .resolve(&tournament.game)
            .ok_or_else(|| CoordinatorError::NotFound(format!("game {}", tournament.game)))?;

        let ready = self
            .store
            .list_registries_by_status(tournament.tournament_id, RegistryStatus::Ready)
            .await?;
        if ready.len() < MIN_READY_PLAYERS {
            warn!(
                "Tournament {} cannot start with {} ready player(s)",
                tournament.tournament_id,
                ready.len()
            );
            return Err(CoordinatorError::InsufficientPlayers {
                needed: MIN_READY_PLAYERS,
                current: ready.len(),
            });
        }
        let passkeys: Vec<&str> = ready.iter().map(|r| r.passkey.as_str()).collect();

        let round = PairingRound {
            tournament_id: tournament.tournament_id,
            players: ready.iter().map(|r| r.passkey.clone()).collect(),
            matches: plan_round(&passkeys)
                .into_iter()
                .map(|candidate| {
                    let status = if candidate.scheduled {
                        MatchStatus::Ongoing
                    } else {
                        MatchStatus::Waiting
                    };
                    Match::new(
                        tournament.tournament_id,
                        ready[candidate.player1].passkey.clone(),
                        ready[candidate.player2].passkey.clone(),
                        status,
                        engine.init(),
                    )
                })
                .collect(),
        };
        let started = self.store.start_round(&round).await?;

        let owners: HashMap<&str, &UserId> = ready
            .iter()
            .map(|r| (r.passkey.as_str(), &r.player_user_id))
            .collect();
        let scheduled: Vec<&Match> = round.scheduled().collect();
        info!(
            "Tournament {} started: {} ready players, {} matches started, {} waiting",
            started.tournament_id,
            ready.len(),
            scheduled.len(),
            round.waiting().count()
        );

        let event = ServerEvent::tournament_started(started.clone());
        for m in &scheduled {
            for side in [Turn::Player1, Turn::Player2] {
                if let Some(user_id) = owners.get(m.passkey_of(side)) {
                    self.notifier.notify_user(user_id, &event).await;
                }
            }
        }
        for m in &scheduled {
            if let Some(user_id) = owners.get(m.passkey_of(m.next_turn)) {
                self.notifier
                    .notify_user(user_id, &ServerEvent::require_move(m.view()))
                    .await;
            }
        }

        Ok((started, round))
    }

    /// Start the first WAITING match of a newly ready player whose opponent is
    /// also READY. Returns the started match, if any.
    pub async fn activate_waiting(
        &self,
        registry: &PlayerRegistry,
    ) -> CoordinatorResult<Option<Match>> {
        let waiting = self
            .store
            .list_matches_by_passkey(&registry.passkey, MatchStatus::Waiting)
            .await?;

        for candidate in waiting
            .iter()
            .filter(|m| m.tournament_id == registry.tournament_id)
        {
            let Some(side) = candidate.side_of(&registry.passkey) else {
                continue;
            };
            let Some(opponent) = self
                .store
                .get_registry_by_passkey(candidate.passkey_of(side.opponent()))
                .await?
            else {
                continue;
            };
            if opponent.status != RegistryStatus::Ready {
                continue;
            }

            match self
                .store
                .activate_match(candidate.tournament_id, candidate.match_id)
                .await
            {
                Ok(activated) => {
                    info!(
                        "Match {} started for a newly ready player",
                        activated.match_id
                    );
                    let to_move = if activated.passkey_of(activated.next_turn) == registry.passkey
                    {
                        &registry.player_user_id
                    } else {
                        &opponent.player_user_id
                    };
                    self.notifier
                        .notify_user(to_move, &ServerEvent::require_move(activated.view()))
                        .await;
                    return Ok(Some(activated));
                }
                Err(CoordinatorError::Conflict(reason)) => {
                    warn!("Match {} not activated: {reason}", candidate.match_id);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }
}
