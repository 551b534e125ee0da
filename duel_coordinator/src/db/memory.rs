//! In-memory store.
//!
//! All rows live behind one lock, so each multi-row write checks every
//! precondition before touching anything and is applied as a unit.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

use super::repository::{
    MatchCompletion, MatchRepository, PairingRound, RegistryRepository, TournamentRepository,
};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::game::{GameState, Turn};
use crate::matches::{Match, MatchId, MatchStatus, score_for};
use crate::registry::{PlayerRegistry, RegistryStatus};
use crate::tournament::{Tournament, TournamentId, TournamentStatus};

#[derive(Default)]
struct Tables {
    tournaments: Vec<Tournament>,
    registries: Vec<PlayerRegistry>,
    matches: Vec<Match>,
}

impl Tables {
    fn registry_index(&self, tournament_id: TournamentId, user_id: &str) -> Option<usize> {
        self.registries
            .iter()
            .position(|r| r.tournament_id == tournament_id && r.player_user_id == user_id)
    }

    fn passkey_index(&self, passkey: &str) -> CoordinatorResult<usize> {
        self.registries
            .iter()
            .position(|r| r.passkey == passkey)
            .ok_or_else(|| CoordinatorError::NotFound("registry for passkey".to_string()))
    }

    fn match_index(&self, tournament_id: TournamentId, match_id: MatchId) -> CoordinatorResult<usize> {
        self.matches
            .iter()
            .position(|m| m.tournament_id == tournament_id && m.match_id == match_id)
            .ok_or_else(|| CoordinatorError::NotFound(format!("match {match_id}")))
    }

    /// Ongoing match, other than `m`, played by either participant of `m`
    fn busy_participant(&self, m: &Match) -> Option<&Match> {
        self.matches.iter().find(|other| {
            other.status == MatchStatus::Ongoing
                && other.match_id != m.match_id
                && (other.involves(&m.player1_passkey) || other.involves(&m.player2_passkey))
        })
    }

    /// Registry indexes of both participants, each required to be at one of `allowed`
    fn participants(
        &self,
        m: &Match,
        allowed: &[RegistryStatus],
    ) -> CoordinatorResult<[usize; 2]> {
        let mut indexes = [0; 2];
        for (slot, side) in [Turn::Player1, Turn::Player2].into_iter().enumerate() {
            let index = self.passkey_index(m.passkey_of(side))?;
            let status = self.registries[index].status;
            if !allowed.contains(&status) {
                return Err(CoordinatorError::conflict(format!(
                    "participant of match {} is {status}",
                    m.match_id
                )));
            }
            indexes[slot] = index;
        }
        Ok(indexes)
    }
}

/// Store kept in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn insert_tournament(&self, tournament: &Tournament) -> CoordinatorResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .tournaments
            .iter()
            .any(|t| t.tournament_id == tournament.tournament_id)
        {
            return Err(CoordinatorError::conflict("tournament already exists"));
        }
        tables.tournaments.push(tournament.clone());
        Ok(())
    }

    async fn get_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> CoordinatorResult<Option<Tournament>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tournaments
            .iter()
            .find(|t| t.tournament_id == tournament_id)
            .cloned())
    }

    async fn list_tournaments_by_status(
        &self,
        status: TournamentStatus,
    ) -> CoordinatorResult<Vec<Tournament>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tournaments
            .iter()
            .rev()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }

    async fn list_tournaments_by_creator(
        &self,
        user_id: &str,
    ) -> CoordinatorResult<Vec<Tournament>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tournaments
            .iter()
            .rev()
            .filter(|t| t.created_by == user_id)
            .cloned()
            .collect())
    }

    async fn transition_tournament(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> CoordinatorResult<Tournament> {
        let mut tables = self.tables.write().await;
        let tournament = tables
            .tournaments
            .iter_mut()
            .find(|t| t.tournament_id == tournament_id)
            .ok_or_else(|| CoordinatorError::NotFound(format!("tournament {tournament_id}")))?;

        if tournament.status != from {
            return Err(CoordinatorError::conflict(format!(
                "tournament {tournament_id} is {}, expected {from}",
                tournament.status
            )));
        }
        tournament.status = to;
        Ok(tournament.clone())
    }
}

#[async_trait]
impl RegistryRepository for MemoryStore {
    async fn insert_registry(&self, registry: &PlayerRegistry) -> CoordinatorResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .registry_index(registry.tournament_id, &registry.player_user_id)
            .is_some()
        {
            return Err(CoordinatorError::conflict("player already registered"));
        }
        if tables.registries.iter().any(|r| r.passkey == registry.passkey) {
            return Err(CoordinatorError::conflict("passkey already in use"));
        }
        tables.registries.push(registry.clone());
        Ok(())
    }

    async fn get_registry(
        &self,
        tournament_id: TournamentId,
        user_id: &str,
    ) -> CoordinatorResult<Option<PlayerRegistry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .registry_index(tournament_id, user_id)
            .map(|index| tables.registries[index].clone()))
    }

    async fn get_registry_by_passkey(
        &self,
        passkey: &str,
    ) -> CoordinatorResult<Option<PlayerRegistry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .registries
            .iter()
            .find(|r| r.passkey == passkey)
            .cloned())
    }

    async fn list_registries(
        &self,
        tournament_id: TournamentId,
    ) -> CoordinatorResult<Vec<PlayerRegistry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .registries
            .iter()
            .filter(|r| r.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn list_registries_by_status(
        &self,
        tournament_id: TournamentId,
        status: RegistryStatus,
    ) -> CoordinatorResult<Vec<PlayerRegistry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .registries
            .iter()
            .filter(|r| r.tournament_id == tournament_id && r.status == status)
            .cloned()
            .collect())
    }

    async fn list_user_registries_by_status(
        &self,
        user_id: &str,
        status: RegistryStatus,
    ) -> CoordinatorResult<Vec<PlayerRegistry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .registries
            .iter()
            .filter(|r| r.player_user_id == user_id && r.status == status)
            .cloned()
            .collect())
    }

    async fn transition_registry(
        &self,
        tournament_id: TournamentId,
        user_id: &str,
        from: &[RegistryStatus],
        to: RegistryStatus,
    ) -> CoordinatorResult<PlayerRegistry> {
        let mut tables = self.tables.write().await;
        let index = tables
            .registry_index(tournament_id, user_id)
            .ok_or_else(|| CoordinatorError::NotFound(format!("registry of {user_id}")))?;

        let registry = &mut tables.registries[index];
        if !from.contains(&registry.status) {
            return Err(CoordinatorError::conflict(format!(
                "registry of {user_id} is {}",
                registry.status
            )));
        }
        registry.status = to;
        Ok(registry.clone())
    }
}

#[async_trait]
impl MatchRepository for MemoryStore {
    async fn get_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> CoordinatorResult<Option<Match>> {
        let tables = self.tables.read().await;
        Ok(tables
            .matches
            .iter()
            .find(|m| m.tournament_id == tournament_id && m.match_id == match_id)
            .cloned())
    }

    async fn find_match(&self, match_id: MatchId) -> CoordinatorResult<Option<Match>> {
        let tables = self.tables.read().await;
        Ok(tables
            .matches
            .iter()
            .find(|m| m.match_id == match_id)
            .cloned())
    }

    async fn list_matches_by_passkey(
        &self,
        passkey: &str,
        status: MatchStatus,
    ) -> CoordinatorResult<Vec<Match>> {
        let tables = self.tables.read().await;
        Ok(tables
            .matches
            .iter()
            .filter(|m| m.status == status && m.involves(passkey))
            .cloned()
            .collect())
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> CoordinatorResult<Vec<Match>> {
        let tables = self.tables.read().await;
        Ok(tables
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn start_round(&self, round: &PairingRound) -> CoordinatorResult<Tournament> {
        let mut tables = self.tables.write().await;
        let tournament_id = round.tournament_id;
        let tournament_index = tables
            .tournaments
            .iter()
            .position(|t| t.tournament_id == tournament_id)
            .ok_or_else(|| CoordinatorError::NotFound(format!("tournament {tournament_id}")))?;

        let status = tables.tournaments[tournament_index].status;
        if status != TournamentStatus::Open {
            return Err(CoordinatorError::conflict(format!(
                "tournament {tournament_id} is {status}, expected {}",
                TournamentStatus::Open
            )));
        }

        let ready: HashSet<&str> = tables
            .registries
            .iter()
            .filter(|r| r.tournament_id == tournament_id && r.status == RegistryStatus::Ready)
            .map(|r| r.passkey.as_str())
            .collect();
        let planned: HashSet<&str> = round.players.iter().map(String::as_str).collect();
        if ready != planned {
            return Err(CoordinatorError::conflict(format!(
                "ready players of tournament {tournament_id} changed while pairing"
            )));
        }

        let mut booked = HashSet::new();
        let mut to_book = Vec::new();
        for m in round.scheduled() {
            for passkey in [&m.player1_passkey, &m.player2_passkey] {
                if !booked.insert(passkey.as_str()) {
                    return Err(CoordinatorError::conflict(
                        "passkey scheduled twice in one round",
                    ));
                }
            }
            to_book.extend(tables.participants(m, &[RegistryStatus::Ready])?);
        }
        if round
            .matches
            .iter()
            .any(|m| tables.match_index(m.tournament_id, m.match_id).is_ok())
        {
            return Err(CoordinatorError::conflict("match already exists"));
        }

        for index in to_book {
            tables.registries[index].status = RegistryStatus::InMatch;
        }
        tables.matches.extend(round.matches.iter().cloned());
        let tournament = &mut tables.tournaments[tournament_index];
        tournament.status = TournamentStatus::Started;
        Ok(tournament.clone())
    }

    async fn activate_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> CoordinatorResult<Match> {
        let mut tables = self.tables.write().await;
        let index = tables.match_index(tournament_id, match_id)?;
        let m = &tables.matches[index];
        if m.status != MatchStatus::Waiting {
            return Err(CoordinatorError::conflict(format!(
                "match {match_id} is {}",
                m.status
            )));
        }
        if let Some(busy) = tables.busy_participant(m) {
            return Err(CoordinatorError::conflict(format!(
                "a participant of match {match_id} is still playing match {}",
                busy.match_id
            )));
        }
        let participants = tables.participants(m, &[RegistryStatus::Ready])?;

        for participant in participants {
            tables.registries[participant].status = RegistryStatus::InMatch;
        }
        tables.matches[index].status = MatchStatus::Ongoing;
        Ok(tables.matches[index].clone())
    }

    async fn record_move(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        expected_version: u32,
        state: &GameState,
        turn: Turn,
    ) -> CoordinatorResult<Match> {
        let mut tables = self.tables.write().await;
        let index = tables.match_index(tournament_id, match_id)?;
        let m = &mut tables.matches[index];
        if m.status != MatchStatus::Ongoing || m.version != expected_version {
            return Err(CoordinatorError::conflict(format!(
                "match {match_id} moved concurrently"
            )));
        }
        m.game_state = state.clone();
        m.next_turn = turn;
        m.version += 1;
        Ok(m.clone())
    }

    async fn complete_match(&self, completion: &MatchCompletion) -> CoordinatorResult<Match> {
        let mut tables = self.tables.write().await;
        let index = tables.match_index(completion.tournament_id, completion.match_id)?;
        let m = &tables.matches[index];
        if m.status != MatchStatus::Ongoing || m.version != completion.expected_version {
            return Err(CoordinatorError::conflict(format!(
                "match {} moved concurrently",
                completion.match_id
            )));
        }
        let participants =
            tables.participants(m, &[RegistryStatus::InMatch, RegistryStatus::Unknown])?;

        for (participant, side) in participants.into_iter().zip([Turn::Player1, Turn::Player2]) {
            let registry = &mut tables.registries[participant];
            registry.status = RegistryStatus::Unknown;
            if let Some(column) = score_for(completion.winner, side) {
                registry.record(column);
            }
        }

        let m = &mut tables.matches[index];
        m.status = MatchStatus::Finished;
        m.game_state = completion.final_state.clone();
        m.next_turn = completion.final_turn;
        m.winner = completion.winner;
        m.version += 1;
        Ok(m.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameRef, Outcome};
    use crate::tournament::TournamentConfig;
    use serde_json::json;

    /// OPEN tournament with alice and bob registered at `status`
    async fn seeded(store: &MemoryStore, status: RegistryStatus) -> (Tournament, Vec<PlayerRegistry>) {
        let mut tournament = Tournament::new(
            "host",
            TournamentConfig::new("Cup", GameRef::new("tictactoe", "0.0.1")),
        );
        tournament.status = TournamentStatus::Open;
        store.insert_tournament(&tournament).await.unwrap();

        let mut registries = Vec::new();
        for user in ["alice", "bob"] {
            registries.push(add_player(store, &tournament, user, status).await);
        }
        (tournament, registries)
    }

    async fn add_player(
        store: &MemoryStore,
        tournament: &Tournament,
        user: &str,
        status: RegistryStatus,
    ) -> PlayerRegistry {
        let mut registry = PlayerRegistry::new(tournament.tournament_id, user);
        registry.status = status;
        store.insert_registry(&registry).await.unwrap();
        registry
    }

    fn pairing(
        tournament: &Tournament,
        player1: &PlayerRegistry,
        player2: &PlayerRegistry,
        status: MatchStatus,
    ) -> Match {
        Match::new(
            tournament.tournament_id,
            player1.passkey.clone(),
            player2.passkey.clone(),
            status,
            json!([]),
        )
    }

    fn round(tournament: &Tournament, players: &[&PlayerRegistry], matches: Vec<Match>) -> PairingRound {
        PairingRound {
            tournament_id: tournament.tournament_id,
            players: players.iter().map(|r| r.passkey.clone()).collect(),
            matches,
        }
    }

    async fn status_of(store: &MemoryStore, tournament: &Tournament) -> TournamentStatus {
        store
            .get_tournament(tournament.tournament_id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    #[tokio::test]
    async fn test_transition_tournament_requires_expected_status() {
        let store = MemoryStore::new();
        let (tournament, _) = seeded(&store, RegistryStatus::Unknown).await;

        let err = store
            .transition_tournament(
                tournament.tournament_id,
                TournamentStatus::Created,
                TournamentStatus::Open,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let store = MemoryStore::new();
        let (tournament, _) = seeded(&store, RegistryStatus::Unknown).await;

        let again = PlayerRegistry::new(tournament.tournament_id, "alice");
        assert!(matches!(
            store.insert_registry(&again).await,
            Err(CoordinatorError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_start_round_books_players_and_starts_tournament() {
        let store = MemoryStore::new();
        let (tournament, registries) = seeded(&store, RegistryStatus::Ready).await;
        let m = pairing(&tournament, &registries[0], &registries[1], MatchStatus::Ongoing);

        let started = store
            .start_round(&round(&tournament, &[&registries[0], &registries[1]], vec![m]))
            .await
            .unwrap();
        assert_eq!(started.status, TournamentStatus::Started);

        for registry in &registries {
            let stored = store
                .get_registry_by_passkey(&registry.passkey)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.status, RegistryStatus::InMatch);
        }
    }

    #[tokio::test]
    async fn test_start_round_leaves_tournament_open_when_players_left() {
        let store = MemoryStore::new();
        let (tournament, registries) = seeded(&store, RegistryStatus::Ready).await;
        let m = pairing(&tournament, &registries[0], &registries[1], MatchStatus::Ongoing);

        // bob drops between planning and writing the round
        store
            .transition_registry(
                tournament.tournament_id,
                "bob",
                &[RegistryStatus::Ready],
                RegistryStatus::Unknown,
            )
            .await
            .unwrap();

        assert!(matches!(
            store
                .start_round(&round(&tournament, &[&registries[0], &registries[1]], vec![m]))
                .await,
            Err(CoordinatorError::Conflict(_))
        ));
        assert_eq!(status_of(&store, &tournament).await, TournamentStatus::Open);
        assert!(store.list_matches(tournament.tournament_id).await.unwrap().is_empty());
        let alice = store
            .get_registry(tournament.tournament_id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alice.status, RegistryStatus::Ready);
    }

    #[tokio::test]
    async fn test_start_round_rejects_unplanned_ready_player() {
        let store = MemoryStore::new();
        let (tournament, registries) = seeded(&store, RegistryStatus::Ready).await;
        let m = pairing(&tournament, &registries[0], &registries[1], MatchStatus::Ongoing);
        add_player(&store, &tournament, "carol", RegistryStatus::Ready).await;

        assert!(matches!(
            store
                .start_round(&round(&tournament, &[&registries[0], &registries[1]], vec![m]))
                .await,
            Err(CoordinatorError::Conflict(_))
        ));
        assert_eq!(status_of(&store, &tournament).await, TournamentStatus::Open);
    }

    #[tokio::test]
    async fn test_start_round_runs_once() {
        let store = MemoryStore::new();
        let (tournament, registries) = seeded(&store, RegistryStatus::Ready).await;
        let players = [&registries[0], &registries[1]];
        let waiting = pairing(&tournament, &registries[0], &registries[1], MatchStatus::Waiting);

        store
            .start_round(&round(&tournament, &players, vec![waiting.clone()]))
            .await
            .unwrap();
        assert!(matches!(
            store.start_round(&round(&tournament, &players, vec![waiting])).await,
            Err(CoordinatorError::Conflict(_))
        ));
        assert_eq!(store.list_matches(tournament.tournament_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_activate_match_is_all_or_nothing() {
        let store = MemoryStore::new();
        let (tournament, registries) = seeded(&store, RegistryStatus::Ready).await;
        let m = pairing(&tournament, &registries[0], &registries[1], MatchStatus::Waiting);
        store
            .start_round(&round(&tournament, &[&registries[0], &registries[1]], vec![m.clone()]))
            .await
            .unwrap();

        store
            .transition_registry(
                tournament.tournament_id,
                "bob",
                &[RegistryStatus::Ready],
                RegistryStatus::Unknown,
            )
            .await
            .unwrap();

        assert!(store
            .activate_match(tournament.tournament_id, m.match_id)
            .await
            .is_err());
        let alice = store
            .get_registry(tournament.tournament_id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alice.status, RegistryStatus::Ready);
        let stored = store
            .get_match(tournament.tournament_id, m.match_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, MatchStatus::Waiting);
    }

    #[tokio::test]
    async fn test_activate_match_refuses_player_still_in_a_match() {
        let store = MemoryStore::new();
        let (tournament, registries) = seeded(&store, RegistryStatus::Ready).await;
        let carol = add_player(&store, &tournament, "carol", RegistryStatus::Ready).await;
        let (alice, bob) = (&registries[0], &registries[1]);

        let playing = pairing(&tournament, alice, bob, MatchStatus::Ongoing);
        let waiting = pairing(&tournament, alice, &carol, MatchStatus::Waiting);
        store
            .start_round(&round(
                &tournament,
                &[alice, bob, &carol],
                vec![playing.clone(), waiting.clone()],
            ))
            .await
            .unwrap();

        // alice dropped and came back ready while her match is still on
        store
            .transition_registry(
                tournament.tournament_id,
                "alice",
                &[RegistryStatus::InMatch],
                RegistryStatus::Ready,
            )
            .await
            .unwrap();

        assert!(matches!(
            store
                .activate_match(tournament.tournament_id, waiting.match_id)
                .await,
            Err(CoordinatorError::Conflict(_))
        ));
        let ongoing = store
            .list_matches_by_passkey(&alice.passkey, MatchStatus::Ongoing)
            .await
            .unwrap();
        assert_eq!(ongoing.len(), 1);
        assert_eq!(ongoing[0].match_id, playing.match_id);
    }

    #[tokio::test]
    async fn test_stale_move_cannot_overwrite_later_moves() {
        let store = MemoryStore::new();
        let (tournament, registries) = seeded(&store, RegistryStatus::Ready).await;
        let m = pairing(&tournament, &registries[0], &registries[1], MatchStatus::Ongoing);
        store
            .start_round(&round(&tournament, &[&registries[0], &registries[1]], vec![m.clone()]))
            .await
            .unwrap();

        let id = tournament.tournament_id;
        let first = store
            .record_move(id, m.match_id, 0, &json!(["x"]), Turn::Player2)
            .await
            .unwrap();
        let second = store
            .record_move(id, m.match_id, first.version, &json!(["x", "o"]), Turn::Player1)
            .await
            .unwrap();
        assert_eq!(second.version, 2);

        // Same turn as version 0, computed from the original state
        assert!(matches!(
            store
                .record_move(id, m.match_id, m.version, &json!(["late"]), Turn::Player2)
                .await,
            Err(CoordinatorError::Conflict(_))
        ));
        let stale_completion = MatchCompletion {
            tournament_id: id,
            match_id: m.match_id,
            expected_version: m.version,
            final_state: json!(["late"]),
            final_turn: Turn::Player2,
            winner: Outcome::Player1,
        };
        assert!(matches!(
            store.complete_match(&stale_completion).await,
            Err(CoordinatorError::Conflict(_))
        ));

        let stored = store.get_match(id, m.match_id).await.unwrap().unwrap();
        assert_eq!(stored.game_state, json!(["x", "o"]));
        assert_eq!(stored.status, MatchStatus::Ongoing);
    }

    #[tokio::test]
    async fn test_complete_match_applies_once() {
        let store = MemoryStore::new();
        let (tournament, registries) = seeded(&store, RegistryStatus::Ready).await;
        let m = pairing(&tournament, &registries[0], &registries[1], MatchStatus::Ongoing);
        store
            .start_round(&round(&tournament, &[&registries[0], &registries[1]], vec![m.clone()]))
            .await
            .unwrap();

        let completion = MatchCompletion {
            tournament_id: tournament.tournament_id,
            match_id: m.match_id,
            expected_version: 0,
            final_state: json!(["done"]),
            final_turn: Turn::Player2,
            winner: Outcome::Player1,
        };
        let finished = store.complete_match(&completion).await.unwrap();
        assert_eq!(finished.status, MatchStatus::Finished);
        assert!(matches!(
            store.complete_match(&completion).await,
            Err(CoordinatorError::Conflict(_))
        ));

        let alice = store
            .get_registry_by_passkey(&registries[0].passkey)
            .await
            .unwrap()
            .unwrap();
        let bob = store
            .get_registry_by_passkey(&registries[1].passkey)
            .await
            .unwrap()
            .unwrap();
        assert_eq!((alice.wins, alice.losses, alice.status), (1, 0, RegistryStatus::Unknown));
        assert_eq!((bob.wins, bob.losses, bob.status), (0, 1, RegistryStatus::Unknown));
    }
}
