//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::game::GameRef;
use crate::session::UserId;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Tournament lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Created, not yet accepting connections
    Created,
    /// Accepting connections and ready signals
    Open,
    /// Pairing done, matches being played
    Started,
    /// Terminal
    Completed,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Created => "CREATED",
            TournamentStatus::Open => "OPEN",
            TournamentStatus::Started => "STARTED",
            TournamentStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATED" => Ok(TournamentStatus::Created),
            "OPEN" => Ok(TournamentStatus::Open),
            "STARTED" => Ok(TournamentStatus::Started),
            "COMPLETED" => Ok(TournamentStatus::Completed),
            other => Err(format!("unknown tournament status '{other}'")),
        }
    }
}

/// Parameters of a new tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    pub title: String,
    /// Game pinned for the tournament's lifetime
    #[serde(rename = "gameId")]
    pub game: GameRef,
    /// Rounds requested by the creator; pairing currently runs one round
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

fn default_rounds() -> u32 {
    1
}

impl TournamentConfig {
    pub fn new(title: impl Into<String>, game: GameRef) -> Self {
        Self {
            title: title.into(),
            game,
            rounds: default_rounds(),
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }
}

/// Tournament row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub tournament_id: TournamentId,
    pub created_by: UserId,
    pub title: String,
    #[serde(rename = "gameId")]
    pub game: GameRef,
    pub rounds: u32,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Fresh tournament in `CREATED` status
    pub fn new(created_by: impl Into<UserId>, config: TournamentConfig) -> Self {
        Self {
            tournament_id: Uuid::new_v4(),
            created_by: created_by.into(),
            title: config.title,
            game: config.game,
            rounds: config.rounds,
            status: TournamentStatus::Created,
            created_at: Utc::now(),
        }
    }

    pub fn is_created_by(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }
}
