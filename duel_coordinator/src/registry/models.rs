//! Player registry data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::session::UserId;
use crate::tournament::TournamentId;

/// Per-registration secret addressing a player inside matches
pub type Passkey = String;

/// Generate a new passkey
pub fn generate_passkey() -> Passkey {
    Uuid::new_v4().simple().to_string()
}

/// Player status within one tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistryStatus {
    /// Registered but not waiting for a match
    Unknown,
    /// Waiting to be paired
    Ready,
    /// Playing a match
    InMatch,
}

impl RegistryStatus {
    /// Statuses swept back to `Unknown` on disconnect
    pub const ACTIVE: [RegistryStatus; 2] = [RegistryStatus::Ready, RegistryStatus::InMatch];

    pub fn as_str(self) -> &'static str {
        match self {
            RegistryStatus::Unknown => "UNKNOWN",
            RegistryStatus::Ready => "READY",
            RegistryStatus::InMatch => "IN_MATCH",
        }
    }
}

impl fmt::Display for RegistryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(RegistryStatus::Unknown),
            "READY" => Ok(RegistryStatus::Ready),
            "IN_MATCH" => Ok(RegistryStatus::InMatch),
            other => Err(format!("unknown registry status '{other}'")),
        }
    }
}

/// Counter incremented when a match completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreColumn {
    Win,
    Loss,
    Draw,
}

/// A player's participation record within one tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRegistry {
    pub tournament_id: TournamentId,
    pub player_user_id: UserId,
    pub passkey: Passkey,
    pub status: RegistryStatus,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub registered_at: DateTime<Utc>,
}

impl PlayerRegistry {
    /// Fresh registration with a newly generated passkey
    pub fn new(tournament_id: TournamentId, player_user_id: impl Into<UserId>) -> Self {
        Self {
            tournament_id,
            player_user_id: player_user_id.into(),
            passkey: generate_passkey(),
            status: RegistryStatus::Unknown,
            wins: 0,
            losses: 0,
            draws: 0,
            registered_at: Utc::now(),
        }
    }

    /// Increment one counter
    pub fn record(&mut self, column: ScoreColumn) {
        match column {
            ScoreColumn::Win => self.wins += 1,
            ScoreColumn::Loss => self.losses += 1,
            ScoreColumn::Draw => self.draws += 1,
        }
    }

    pub fn matches_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_starts_unknown_with_zero_score() {
        let registry = PlayerRegistry::new(Uuid::new_v4(), "alice");
        assert_eq!(registry.status, RegistryStatus::Unknown);
        assert_eq!(registry.matches_played(), 0);
        assert_eq!(registry.passkey.len(), 32);
    }

    #[test]
    fn test_passkeys_are_unique() {
        let a = PlayerRegistry::new(Uuid::new_v4(), "alice");
        let b = PlayerRegistry::new(a.tournament_id, "bob");
        assert_ne!(a.passkey, b.passkey);
    }

    #[test]
    fn test_record_increments_single_counter() {
        let mut registry = PlayerRegistry::new(Uuid::new_v4(), "alice");
        registry.record(ScoreColumn::Draw);
        assert_eq!((registry.wins, registry.losses, registry.draws), (0, 0, 1));
    }

    #[test]
    fn test_status_storage_names() {
        for status in [
            RegistryStatus::Unknown,
            RegistryStatus::Ready,
            RegistryStatus::InMatch,
        ] {
            assert_eq!(status.as_str().parse::<RegistryStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_value(RegistryStatus::InMatch).unwrap(),
            "IN_MATCH"
        );
    }
}
