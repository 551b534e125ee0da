//! Match data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::game::{GameState, Outcome, Turn};
use crate::registry::{Passkey, ScoreColumn};
use crate::tournament::TournamentId;

/// Match ID type
pub type MatchId = Uuid;

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Paired but not scheduled this round
    Waiting,
    Ongoing,
    /// Terminal
    Finished,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Waiting => "WAITING",
            MatchStatus::Ongoing => "ONGOING",
            MatchStatus::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(MatchStatus::Waiting),
            "ONGOING" => Ok(MatchStatus::Ongoing),
            "FINISHED" => Ok(MatchStatus::Finished),
            other => Err(format!("unknown match status '{other}'")),
        }
    }
}

/// Match row. Players are referenced by passkey, never by user id.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub player1_passkey: Passkey,
    pub player2_passkey: Passkey,
    pub status: MatchStatus,
    pub game_state: GameState,
    pub next_turn: Turn,
    pub winner: Outcome,
    /// Bumped by every write of the match state; moves are applied against it
    pub version: u32,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// New match with player 1 to move
    pub fn new(
        tournament_id: TournamentId,
        player1_passkey: Passkey,
        player2_passkey: Passkey,
        status: MatchStatus,
        initial_state: GameState,
    ) -> Self {
        Self {
            tournament_id,
            match_id: Uuid::new_v4(),
            player1_passkey,
            player2_passkey,
            status,
            game_state: initial_state,
            next_turn: Turn::Player1,
            winner: Outcome::Undecided,
            version: 0,
            created_at: Utc::now(),
        }
    }

    /// Side played by a passkey
    pub fn side_of(&self, passkey: &str) -> Option<Turn> {
        if self.player1_passkey == passkey {
            Some(Turn::Player1)
        } else if self.player2_passkey == passkey {
            Some(Turn::Player2)
        } else {
            None
        }
    }

    pub fn passkey_of(&self, side: Turn) -> &str {
        match side {
            Turn::Player1 => &self.player1_passkey,
            Turn::Player2 => &self.player2_passkey,
        }
    }

    pub fn involves(&self, passkey: &str) -> bool {
        self.side_of(passkey).is_some()
    }

    /// Projection safe to show either participant
    pub fn view(&self) -> MatchView {
        MatchView {
            tournament_id: self.tournament_id,
            match_id: self.match_id,
            game_state: self.game_state.clone(),
            next_turn: self.next_turn,
        }
    }
}

/// Counter a side earns from a final outcome
pub fn score_for(outcome: Outcome, side: Turn) -> Option<ScoreColumn> {
    match (outcome, outcome.winner()) {
        (Outcome::Undecided, _) => None,
        (Outcome::Draw, _) => Some(ScoreColumn::Draw),
        (_, Some(winner)) if winner == side => Some(ScoreColumn::Win),
        _ => Some(ScoreColumn::Loss),
    }
}

/// Minimal match projection pushed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub game_state: GameState,
    pub next_turn: Turn,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Match {
        Match::new(
            Uuid::new_v4(),
            "p1-key".to_string(),
            "p2-key".to_string(),
            MatchStatus::Ongoing,
            json!([[0, 0, 0], [0, 0, 0], [0, 0, 0]]),
        )
    }

    #[test]
    fn test_side_of() {
        let m = sample();
        assert_eq!(m.side_of("p1-key"), Some(Turn::Player1));
        assert_eq!(m.side_of("p2-key"), Some(Turn::Player2));
        assert_eq!(m.side_of("stranger"), None);
        assert_eq!(m.passkey_of(Turn::Player2), "p2-key");
    }

    #[test]
    fn test_view_hides_passkeys() {
        let view = serde_json::to_value(sample().view()).unwrap();
        let text = view.to_string();
        assert!(!text.contains("p1-key"));
        assert!(!text.contains("p2-key"));
        assert_eq!(view["nextTurn"], "player1");
    }

    #[test]
    fn test_score_for() {
        assert_eq!(
            score_for(Outcome::Player1, Turn::Player1),
            Some(ScoreColumn::Win)
        );
        assert_eq!(
            score_for(Outcome::Player1, Turn::Player2),
            Some(ScoreColumn::Loss)
        );
        assert_eq!(
            score_for(Outcome::Draw, Turn::Player2),
            Some(ScoreColumn::Draw)
        );
        assert_eq!(score_for(Outcome::Undecided, Turn::Player1), None);
    }
}
