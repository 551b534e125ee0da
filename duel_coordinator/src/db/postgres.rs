//! PostgreSQL store.
//!
//! Preconditions are expressed as `WHERE` guards (status, match version) on the
//! `UPDATE` itself. Multi-row writes run in one transaction that is dropped (rolled
//! back) as soon as a guard matches fewer rows than expected.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::{collections::HashSet, str::FromStr, sync::Arc};

use super::repository::{
    MatchCompletion, MatchRepository, PairingRound, RegistryRepository, TournamentRepository,
};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::game::{GameState, Turn};
use crate::matches::{Match, MatchId, MatchStatus, score_for};
use crate::registry::{PlayerRegistry, RegistryStatus, ScoreColumn};
use crate::tournament::{Tournament, TournamentId, TournamentStatus};

const TOURNAMENT_COLUMNS: &str =
    "tournament_id, created_by, title, game_id, rounds, status, created_at";

const REGISTRY_COLUMNS: &str =
    "tournament_id, player_user_id, passkey, status, wins, losses, draws, registered_at";

const MATCH_COLUMNS: &str = "tournament_id, match_id, player1_passkey, player2_passkey, status, \
     game_state, next_turn, winner, version, created_at";

/// Decode a text column through its `FromStr` impl
fn parse_column<T>(row: &PgRow, column: &str) -> CoordinatorResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: T::Err| {
        CoordinatorError::Database(sqlx::Error::Decode(
            format!("column {column}: {e}").into(),
        ))
    })
}

fn counter(row: &PgRow, column: &str) -> CoordinatorResult<u32> {
    let value: i32 = row.try_get(column)?;
    Ok(value.max(0) as u32)
}

fn tournament_from_row(row: &PgRow) -> CoordinatorResult<Tournament> {
    let rounds: i32 = row.try_get("rounds")?;
    Ok(Tournament {
        tournament_id: row.try_get("tournament_id")?,
        created_by: row.try_get("created_by")?,
        title: row.try_get("title")?,
        game: parse_column(row, "game_id")?,
        rounds: rounds.max(1) as u32,
        status: parse_column(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn registry_from_row(row: &PgRow) -> CoordinatorResult<PlayerRegistry> {
    Ok(PlayerRegistry {
        tournament_id: row.try_get("tournament_id")?,
        player_user_id: row.try_get("player_user_id")?,
        passkey: row.try_get("passkey")?,
        status: parse_column(row, "status")?,
        wins: counter(row, "wins")?,
        losses: counter(row, "losses")?,
        draws: counter(row, "draws")?,
        registered_at: row.try_get("registered_at")?,
    })
}

fn match_from_row(row: &PgRow) -> CoordinatorResult<Match> {
    Ok(Match {
        tournament_id: row.try_get("tournament_id")?,
        match_id: row.try_get("match_id")?,
        player1_passkey: row.try_get("player1_passkey")?,
        player2_passkey: row.try_get("player2_passkey")?,
        status: parse_column(row, "status")?,
        game_state: row.try_get("game_state")?,
        next_turn: parse_column(row, "next_turn")?,
        winner: parse_column(row, "winner")?,
        version: counter(row, "version")?,
        created_at: row.try_get("created_at")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Score deltas (wins, losses, draws) for one side
fn score_delta(column: Option<ScoreColumn>) -> (i32, i32, i32) {
    match column {
        Some(ScoreColumn::Win) => (1, 0, 0),
        Some(ScoreColumn::Loss) => (0, 1, 0),
        Some(ScoreColumn::Draw) => (0, 0, 1),
        None => (0, 0, 0),
    }
}

/// Store persisted in PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// `NotFound` when the tournament is absent, otherwise `Conflict`
    async fn missed_tournament_guard(
        &self,
        tournament_id: TournamentId,
        expected: TournamentStatus,
    ) -> CoordinatorError {
        match self.get_tournament(tournament_id).await {
            Ok(Some(current)) => CoordinatorError::conflict(format!(
                "tournament {tournament_id} is {}, expected {expected}",
                current.status
            )),
            Ok(None) => CoordinatorError::NotFound(format!("tournament {tournament_id}")),
            Err(e) => e,
        }
    }

    /// `NotFound` when the match is absent, otherwise `Conflict`
    async fn missed_match_guard(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> CoordinatorError {
        match self.get_match(tournament_id, match_id).await {
            Ok(Some(m)) => {
                CoordinatorError::conflict(format!("match {match_id} is {}", m.status))
            }
            Ok(None) => CoordinatorError::NotFound(format!("match {match_id}")),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl TournamentRepository for PgStore {
    async fn insert_tournament(&self, tournament: &Tournament) -> CoordinatorResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO tournaments (tournament_id, created_by, title, game_id, rounds, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(tournament.tournament_id)
        .bind(&tournament.created_by)
        .bind(&tournament.title)
        .bind(tournament.game.to_string())
        .bind(tournament.rounds as i32)
        .bind(tournament.status.as_str())
        .bind(tournament.created_at)
        .execute(self.pool.as_ref())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(CoordinatorError::conflict("tournament already exists"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> CoordinatorResult<Option<Tournament>> {
        let row = sqlx::query(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE tournament_id = $1"
        ))
        .bind(tournament_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.as_ref().map(tournament_from_row).transpose()
    }

    async fn list_tournaments_by_status(
        &self,
        status: TournamentStatus,
    ) -> CoordinatorResult<Vec<Tournament>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(tournament_from_row).collect()
    }

    async fn list_tournaments_by_creator(
        &self,
        user_id: &str,
    ) -> CoordinatorResult<Vec<Tournament>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE created_by = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(tournament_from_row).collect()
    }

    async fn transition_tournament(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> CoordinatorResult<Tournament> {
        let row = sqlx::query(&format!(
            "UPDATE tournaments SET status = $3 WHERE tournament_id = $1 AND status = $2 \
             RETURNING {TOURNAMENT_COLUMNS}"
        ))
        .bind(tournament_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => tournament_from_row(&row),
            None => Err(self.missed_tournament_guard(tournament_id, from).await),
        }
    }
}

#[async_trait]
impl RegistryRepository for PgStore {
    async fn insert_registry(&self, registry: &PlayerRegistry) -> CoordinatorResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO player_registries
                (tournament_id, player_user_id, passkey, status, wins, losses, draws, registered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(registry.tournament_id)
        .bind(&registry.player_user_id)
        .bind(&registry.passkey)
        .bind(registry.status.as_str())
        .bind(registry.wins as i32)
        .bind(registry.losses as i32)
        .bind(registry.draws as i32)
        .bind(registry.registered_at)
        .execute(self.pool.as_ref())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(CoordinatorError::conflict("player already registered"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_registry(
        &self,
        tournament_id: TournamentId,
        user_id: &str,
    ) -> CoordinatorResult<Option<PlayerRegistry>> {
        let row = sqlx::query(&format!(
            "SELECT {REGISTRY_COLUMNS} FROM player_registries \
             WHERE tournament_id = $1 AND player_user_id = $2"
        ))
        .bind(tournament_id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.as_ref().map(registry_from_row).transpose()
    }

    async fn get_registry_by_passkey(
        &self,
        passkey: &str,
    ) -> CoordinatorResult<Option<PlayerRegistry>> {
        let row = sqlx::query(&format!(
            "SELECT {REGISTRY_COLUMNS} FROM player_registries WHERE passkey = $1"
        ))
        .bind(passkey)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.as_ref().map(registry_from_row).transpose()
    }

    async fn list_registries(
        &self,
        tournament_id: TournamentId,
    ) -> CoordinatorResult<Vec<PlayerRegistry>> {
        let rows = sqlx::query(&format!(
            "SELECT {REGISTRY_COLUMNS} FROM player_registries WHERE tournament_id = $1 ORDER BY seq"
        ))
        .bind(tournament_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(registry_from_row).collect()
    }

    async fn list_registries_by_status(
        &self,
        tournament_id: TournamentId,
        status: RegistryStatus,
    ) -> CoordinatorResult<Vec<PlayerRegistry>> {
        let rows = sqlx::query(&format!(
            "SELECT {REGISTRY_COLUMNS} FROM player_registries \
             WHERE tournament_id = $1 AND status = $2 ORDER BY seq"
        ))
        .bind(tournament_id)
        .bind(status.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(registry_from_row).collect()
    }

    async fn list_user_registries_by_status(
        &self,
        user_id: &str,
        status: RegistryStatus,
    ) -> CoordinatorResult<Vec<PlayerRegistry>> {
        let rows = sqlx::query(&format!(
            "SELECT {REGISTRY_COLUMNS} FROM player_registries \
             WHERE player_user_id = $1 AND status = $2 ORDER BY seq"
        ))
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(registry_from_row).collect()
    }

    async fn transition_registry(
        &self,
        tournament_id: TournamentId,
        user_id: &str,
        from: &[RegistryStatus],
        to: RegistryStatus,
    ) -> CoordinatorResult<PlayerRegistry> {
        let from: Vec<&str> = from.iter().map(|status| status.as_str()).collect();
        let row = sqlx::query(&format!(
            "UPDATE player_registries SET status = $4 \
             WHERE tournament_id = $1 AND player_user_id = $2 AND status = ANY($3) \
             RETURNING {REGISTRY_COLUMNS}"
        ))
        .bind(tournament_id)
        .bind(user_id)
        .bind(&from)
        .bind(to.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => registry_from_row(&row),
            None => match self.get_registry(tournament_id, user_id).await? {
                Some(current) => Err(CoordinatorError::conflict(format!(
                    "registry of {user_id} is {}",
                    current.status
                ))),
                None => Err(CoordinatorError::NotFound(format!("registry of {user_id}"))),
            },
        }
    }
}

#[async_trait]
impl MatchRepository for PgStore {
    async fn get_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> CoordinatorResult<Option<Match>> {
        let row = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 AND match_id = $2"
        ))
        .bind(tournament_id)
        .bind(match_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn find_match(&self, match_id: MatchId) -> CoordinatorResult<Option<Match>> {
        let row = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE match_id = $1"
        ))
        .bind(match_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn list_matches_by_passkey(
        &self,
        passkey: &str,
        status: MatchStatus,
    ) -> CoordinatorResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches \
             WHERE (player1_passkey = $1 OR player2_passkey = $1) AND status = $2 ORDER BY seq"
        ))
        .bind(passkey)
        .bind(status.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> CoordinatorResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 ORDER BY seq"
        ))
        .bind(tournament_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn start_round(&self, round: &PairingRound) -> CoordinatorResult<Tournament> {
        let mut booked = HashSet::new();
        for m in round.scheduled() {
            if !booked.insert(m.player1_passkey.as_str())
                || !booked.insert(m.player2_passkey.as_str())
            {
                return Err(CoordinatorError::conflict(
                    "passkey scheduled twice in one round",
                ));
            }
        }

        let tournament_id = round.tournament_id;
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "UPDATE tournaments SET status = 'STARTED' WHERE tournament_id = $1 AND status = 'OPEN' \
             RETURNING {TOURNAMENT_COLUMNS}"
        ))
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?;

        let started = match row {
            Some(row) => tournament_from_row(&row)?,
            None => {
                drop(tx);
                return Err(self
                    .missed_tournament_guard(tournament_id, TournamentStatus::Open)
                    .await);
            }
        };

        // Lock every registry of the tournament so the ready set cannot move
        // until the round is written
        let rows = sqlx::query(
            "SELECT passkey, status FROM player_registries WHERE tournament_id = $1 FOR UPDATE",
        )
        .bind(tournament_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut ready = HashSet::new();
        for row in &rows {
            let status: RegistryStatus = parse_column(row, "status")?;
            if status == RegistryStatus::Ready {
                ready.insert(row.try_get::<String, _>("passkey")?);
            }
        }
        let planned: HashSet<String> = round.players.iter().cloned().collect();
        if ready != planned {
            return Err(CoordinatorError::conflict(format!(
                "ready players of tournament {tournament_id} changed while pairing"
            )));
        }

        for m in round.scheduled() {
            let booked = sqlx::query(
                "UPDATE player_registries SET status = 'IN_MATCH' \
                 WHERE tournament_id = $1 AND passkey IN ($2, $3) AND status = 'READY'",
            )
            .bind(m.tournament_id)
            .bind(&m.player1_passkey)
            .bind(&m.player2_passkey)
            .execute(&mut *tx)
            .await?;

            if booked.rows_affected() != 2 {
                return Err(CoordinatorError::conflict(format!(
                    "participants of match {} are no longer ready",
                    m.match_id
                )));
            }
        }

        for m in &round.matches {
            let result = sqlx::query(
                r#"
                INSERT INTO matches
                    (tournament_id, match_id, player1_passkey, player2_passkey, status,
                     game_state, next_turn, winner, version, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(m.tournament_id)
            .bind(m.match_id)
            .bind(&m.player1_passkey)
            .bind(&m.player2_passkey)
            .bind(m.status.as_str())
            .bind(&m.game_state)
            .bind(m.next_turn.as_str())
            .bind(m.winner.as_str())
            .bind(m.version as i32)
            .bind(m.created_at)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    return Err(CoordinatorError::conflict("match already exists"));
                }
                Err(e) => return Err(e.into()),
            }
        }

        tx.commit().await?;
        Ok(started)
    }

    async fn activate_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> CoordinatorResult<Match> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "UPDATE matches SET status = 'ONGOING' \
             WHERE tournament_id = $1 AND match_id = $2 AND status = 'WAITING' \
             AND NOT EXISTS ( \
                 SELECT 1 FROM matches AS busy \
                 WHERE busy.status = 'ONGOING' \
                 AND (busy.player1_passkey IN (matches.player1_passkey, matches.player2_passkey) \
                      OR busy.player2_passkey IN (matches.player1_passkey, matches.player2_passkey))) \
             RETURNING {MATCH_COLUMNS}"
        ))
        .bind(tournament_id)
        .bind(match_id)
        .fetch_optional(&mut *tx)
        .await?;

        let activated = match row {
            Some(row) => match_from_row(&row)?,
            None => {
                drop(tx);
                return Err(self.missed_match_guard(tournament_id, match_id).await);
            }
        };

        let booked = sqlx::query(
            "UPDATE player_registries SET status = 'IN_MATCH' \
             WHERE passkey IN ($1, $2) AND status = 'READY'",
        )
        .bind(&activated.player1_passkey)
        .bind(&activated.player2_passkey)
        .execute(&mut *tx)
        .await?;

        if booked.rows_affected() != 2 {
            return Err(CoordinatorError::conflict(format!(
                "participants of match {match_id} are no longer ready"
            )));
        }

        tx.commit().await?;
        Ok(activated)
    }

    async fn record_move(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        expected_version: u32,
        state: &GameState,
        turn: Turn,
    ) -> CoordinatorResult<Match> {
        let row = sqlx::query(&format!(
            "UPDATE matches SET game_state = $4, next_turn = $5, version = version + 1 \
             WHERE tournament_id = $1 AND match_id = $2 AND status = 'ONGOING' AND version = $3 \
             RETURNING {MATCH_COLUMNS}"
        ))
        .bind(tournament_id)
        .bind(match_id)
        .bind(expected_version as i32)
        .bind(state)
        .bind(turn.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => match_from_row(&row),
            None => Err(self.missed_match_guard(tournament_id, match_id).await),
        }
    }

    async fn complete_match(&self, completion: &MatchCompletion) -> CoordinatorResult<Match> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "UPDATE matches SET status = 'FINISHED', game_state = $4, next_turn = $5, winner = $6, \
             version = version + 1 \
             WHERE tournament_id = $1 AND match_id = $2 AND status = 'ONGOING' AND version = $3 \
             RETURNING {MATCH_COLUMNS}"
        ))
        .bind(completion.tournament_id)
        .bind(completion.match_id)
        .bind(completion.expected_version as i32)
        .bind(&completion.final_state)
        .bind(completion.final_turn.as_str())
        .bind(completion.winner.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let finished = match row {
            Some(row) => match_from_row(&row)?,
            None => {
                drop(tx);
                return Err(self
                    .missed_match_guard(completion.tournament_id, completion.match_id)
                    .await);
            }
        };

        for side in [Turn::Player1, Turn::Player2] {
            let (wins, losses, draws) = score_delta(score_for(completion.winner, side));
            let released = sqlx::query(
                "UPDATE player_registries \
                 SET status = 'UNKNOWN', wins = wins + $2, losses = losses + $3, draws = draws + $4 \
                 WHERE passkey = $1 AND status IN ('IN_MATCH', 'UNKNOWN')",
            )
            .bind(finished.passkey_of(side))
            .bind(wins)
            .bind(losses)
            .bind(draws)
            .execute(&mut *tx)
            .await?;

            if released.rows_affected() != 1 {
                return Err(CoordinatorError::conflict(format!(
                    "participant of match {} cannot be released",
                    completion.match_id
                )));
            }
        }

        tx.commit().await?;
        Ok(finished)
    }
}
