//! Repository traits over the persisted rows.
//!
//! Every mutation carries its precondition and fails with
//! [`CoordinatorError::Conflict`](crate::error::CoordinatorError::Conflict) when
//! the precondition does not hold, so concurrent invocations can never
//! double-book a player or apply a completion twice. Multi-row writes are
//! atomic as a unit.

use async_trait::async_trait;

use crate::error::CoordinatorResult;
use crate::game::{GameState, Outcome, Turn};
use crate::matches::{Match, MatchId, MatchStatus};
use crate::registry::{Passkey, PlayerRegistry, RegistryStatus};
use crate::tournament::{Tournament, TournamentId, TournamentStatus};

/// First round of a tournament, planned from its READY players
#[derive(Debug, Clone)]
pub struct PairingRound {
    pub tournament_id: TournamentId,
    /// Passkeys that were READY when the round was planned
    pub players: Vec<Passkey>,
    /// Matches in generation order. `Ongoing` ones move both participants from
    /// `Ready` to `InMatch` in the same write.
    pub matches: Vec<Match>,
}

impl PairingRound {
    pub fn scheduled(&self) -> impl Iterator<Item = &Match> {
        self.matches
            .iter()
            .filter(|m| m.status == MatchStatus::Ongoing)
    }

    pub fn waiting(&self) -> impl Iterator<Item = &Match> {
        self.matches
            .iter()
            .filter(|m| m.status == MatchStatus::Waiting)
    }
}

/// Final write of a match
#[derive(Debug, Clone)]
pub struct MatchCompletion {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    /// Version the final move was computed from
    pub expected_version: u32,
    pub final_state: GameState,
    pub final_turn: Turn,
    pub winner: Outcome,
}

/// Tournament rows
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn insert_tournament(&self, tournament: &Tournament) -> CoordinatorResult<()>;

    async fn get_tournament(&self, tournament_id: TournamentId)
    -> CoordinatorResult<Option<Tournament>>;

    /// Newest first
    async fn list_tournaments_by_status(
        &self,
        status: TournamentStatus,
    ) -> CoordinatorResult<Vec<Tournament>>;

    /// Newest first
    async fn list_tournaments_by_creator(&self, user_id: &str)
    -> CoordinatorResult<Vec<Tournament>>;

    /// Move `from` to `to`, failing with `Conflict` if the row is no longer at `from`
    async fn transition_tournament(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> CoordinatorResult<Tournament>;
}

/// Player registry rows
#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// Fails with `Conflict` on a duplicate (tournament, user) or passkey
    async fn insert_registry(&self, registry: &PlayerRegistry) -> CoordinatorResult<()>;

    async fn get_registry(
        &self,
        tournament_id: TournamentId,
        user_id: &str,
    ) -> CoordinatorResult<Option<PlayerRegistry>>;

    async fn get_registry_by_passkey(&self, passkey: &str)
    -> CoordinatorResult<Option<PlayerRegistry>>;

    /// All registries of a tournament, in registration order
    async fn list_registries(&self, tournament_id: TournamentId)
    -> CoordinatorResult<Vec<PlayerRegistry>>;

    /// Registries of a tournament at `status`, in registration order
    async fn list_registries_by_status(
        &self,
        tournament_id: TournamentId,
        status: RegistryStatus,
    ) -> CoordinatorResult<Vec<PlayerRegistry>>;

    /// A user's registries at `status`, across tournaments
    async fn list_user_registries_by_status(
        &self,
        user_id: &str,
        status: RegistryStatus,
    ) -> CoordinatorResult<Vec<PlayerRegistry>>;

    /// Move to `to` if currently at one of `from`, else `Conflict`
    async fn transition_registry(
        &self,
        tournament_id: TournamentId,
        user_id: &str,
        from: &[RegistryStatus],
        to: RegistryStatus,
    ) -> CoordinatorResult<PlayerRegistry>;
}

/// Match rows
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn get_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> CoordinatorResult<Option<Match>>;

    /// Lookup by match id alone, whatever tournament it belongs to
    async fn find_match(&self, match_id: MatchId) -> CoordinatorResult<Option<Match>>;

    /// Matches where the passkey plays either side, at `status`
    async fn list_matches_by_passkey(
        &self,
        passkey: &str,
        status: MatchStatus,
    ) -> CoordinatorResult<Vec<Match>>;

    async fn list_matches(&self, tournament_id: TournamentId) -> CoordinatorResult<Vec<Match>>;

    /// Start a tournament with its first round, as one atomic write: the
    /// tournament moves `Open -> Started`, scheduled participants move
    /// `Ready -> InMatch` and every match is inserted.
    ///
    /// `Conflict` when the tournament is no longer OPEN or its READY players
    /// are not exactly `round.players`; nothing is applied in that case.
    async fn start_round(&self, round: &PairingRound) -> CoordinatorResult<Tournament>;

    /// Atomically move a match `Waiting -> Ongoing` and both participants
    /// `Ready -> InMatch`. `Conflict` if either participant already plays an
    /// ongoing match.
    async fn activate_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> CoordinatorResult<Match>;

    /// Persist a non-terminal move computed from `expected_version`; the match
    /// must still be `Ongoing` at that version
    async fn record_move(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        expected_version: u32,
        state: &GameState,
        turn: Turn,
    ) -> CoordinatorResult<Match>;

    /// Atomically finish a match, reset both participants to `Unknown` and
    /// apply their score counters
    async fn complete_match(&self, completion: &MatchCompletion) -> CoordinatorResult<Match>;
}

/// Everything the coordinator persists
pub trait Store: TournamentRepository + RegistryRepository + MatchRepository {}

impl<T> Store for T where T: TournamentRepository + RegistryRepository + MatchRepository {}
