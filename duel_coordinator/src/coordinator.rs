//! Entry points exposed to the transport layer.
//!
//! Identity is resolved upstream: `requester_id` and `creator_id` arguments are
//! trusted user ids, connection handles come from the transport.

use log::info;
use serde::Serialize;
use std::sync::Arc;

use crate::db::{MemoryStore, Store};
use crate::error::CoordinatorResult;
use crate::game::{GameMove, GameRegistry};
use crate::matches::{Match, MatchId, MatchManager, MoveOutcome};
use crate::matchmaking::MatchmakingEngine;
use crate::notify::{Notifier, ServerEvent, Transport};
use crate::registry::{PlayerRegistry, RegistryManager};
use crate::session::SessionDirectory;
use crate::tournament::{
    Tournament, TournamentConfig, TournamentId, TournamentManager, TournamentStatus,
};

/// Tournament after a successful start, with the size of its first round
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedTournament {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub scheduled_matches: usize,
    pub waiting_matches: usize,
}

/// Result of a ready signal
#[derive(Debug, Clone)]
pub struct ReadyOutcome {
    pub registry: PlayerRegistry,
    /// Waiting match started because the opponent was already ready
    pub activated: Option<Match>,
}

/// Tournament coordinator
#[derive(Clone)]
pub struct Coordinator {
    store: Arc<dyn Store>,
    notifier: Notifier,
    tournaments: TournamentManager,
    registries: RegistryManager,
    matchmaking: MatchmakingEngine,
    matches: MatchManager,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn Store>,
        sessions: SessionDirectory,
        games: GameRegistry,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let games = Arc::new(games);
        let notifier = Notifier::new(sessions.clone(), transport);

        Self {
            tournaments: TournamentManager::new(store.clone(), games.clone()),
            registries: RegistryManager::new(store.clone(), sessions.clone()),
            matchmaking: MatchmakingEngine::new(store.clone(), games.clone(), notifier.clone()),
            matches: MatchManager::new(store.clone(), games, sessions, notifier.clone()),
            notifier,
            store,
        }
    }

    /// Coordinator over in-memory storage and the built-in games
    pub fn in_memory(transport: Arc<dyn Transport>) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            SessionDirectory::in_memory(),
            GameRegistry::with_builtin_games(),
            transport,
        )
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn sessions(&self) -> &SessionDirectory {
        self.notifier.sessions()
    }

    pub async fn create_tournament(
        &self,
        creator_id: &str,
        config: TournamentConfig,
    ) -> CoordinatorResult<Tournament> {
        self.tournaments.create(creator_id, config).await
    }

    pub async fn open_tournament(
        &self,
        tournament_id: TournamentId,
        requester_id: &str,
    ) -> CoordinatorResult<Tournament> {
        self.tournaments.open(tournament_id, requester_id).await
    }

    /// Start the tournament together with its pairing round
    pub async fn start_tournament(
        &self,
        tournament_id: TournamentId,
        requester_id: &str,
    ) -> CoordinatorResult<StartedTournament> {
        let open = self.tournaments.startable(tournament_id, requester_id).await?;
        let (tournament, round) = self.matchmaking.start_round(&open).await?;

        Ok(StartedTournament {
            tournament,
            scheduled_matches: round.scheduled().count(),
            waiting_matches: round.waiting().count(),
        })
    }

    /// Close a started tournament and tell every registered player
    pub async fn complete_tournament(
        &self,
        tournament_id: TournamentId,
        requester_id: &str,
    ) -> CoordinatorResult<Tournament> {
        let tournament = self.tournaments.complete(tournament_id, requester_id).await?;

        let event = ServerEvent::tournament_completed(tournament.clone());
        for registry in self.store.list_registries(tournament_id).await? {
            self.notifier
                .notify_user(&registry.player_user_id, &event)
                .await;
        }
        Ok(tournament)
    }

    pub async fn get_tournament(&self, tournament_id: TournamentId) -> CoordinatorResult<Tournament> {
        self.tournaments.get(tournament_id).await
    }

    pub async fn list_tournaments(
        &self,
        status: TournamentStatus,
    ) -> CoordinatorResult<Vec<Tournament>> {
        self.tournaments.list_by_status(status).await
    }

    pub async fn list_tournaments_by_creator(
        &self,
        creator_id: &str,
    ) -> CoordinatorResult<Vec<Tournament>> {
        self.tournaments.list_by_creator(creator_id).await
    }

    pub async fn register_player(
        &self,
        tournament_id: TournamentId,
        requester_id: &str,
    ) -> CoordinatorResult<PlayerRegistry> {
        self.registries.register(tournament_id, requester_id).await
    }

    pub async fn get_registry(
        &self,
        tournament_id: TournamentId,
        requester_id: &str,
    ) -> CoordinatorResult<PlayerRegistry> {
        self.registries.get(tournament_id, requester_id).await
    }

    pub async fn get_registry_by_passkey(
        &self,
        passkey: &str,
        requester_id: &str,
    ) -> CoordinatorResult<PlayerRegistry> {
        self.registries.get_by_passkey(passkey, requester_id).await
    }

    /// Check that the passkey owner may connect, without binding anything
    pub async fn admit_connection(&self, passkey: &str) -> CoordinatorResult<PlayerRegistry> {
        self.registries.admit(passkey).await
    }

    /// Bind the passkey owner to a new connection
    pub async fn on_connect(
        &self,
        passkey: &str,
        connection_id: &str,
    ) -> CoordinatorResult<PlayerRegistry> {
        self.registries.on_connect(passkey, connection_id).await
    }

    /// Mark the connection's user offline; returns the registries reset
    pub async fn on_disconnect(&self, connection_id: &str) -> CoordinatorResult<Vec<PlayerRegistry>> {
        self.registries.on_disconnect(connection_id).await
    }

    /// Ready signal. In a started tournament this may immediately start a
    /// waiting match against an opponent who is already ready.
    pub async fn on_set_ready(
        &self,
        connection_id: &str,
        tournament_id: TournamentId,
    ) -> CoordinatorResult<ReadyOutcome> {
        let (tournament, registry) = self
            .registries
            .mark_ready(connection_id, tournament_id)
            .await?;

        let activated = if tournament.status == TournamentStatus::Started {
            self.matchmaking.activate_waiting(&registry).await?
        } else {
            None
        };
        if let Some(m) = &activated {
            info!("Ready signal started match {}", m.match_id);
        }

        Ok(ReadyOutcome {
            registry,
            activated,
        })
    }

    pub async fn on_move(
        &self,
        connection_id: &str,
        passkey: &str,
        tournament_id: TournamentId,
        match_id: MatchId,
        mv: &GameMove,
    ) -> CoordinatorResult<MoveOutcome> {
        self.matches
            .submit_move(connection_id, passkey, tournament_id, match_id, mv)
            .await
    }
}
