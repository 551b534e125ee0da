//! Push events sent to connected players.
//!
//! Every event serializes as `{"type": ..., "payload": ...}`. Match payloads are
//! [`MatchView`]s, which never carry a passkey.

use serde::{Deserialize, Serialize};

use crate::game::{Outcome, Turn};
use crate::matches::MatchView;
use crate::tournament::Tournament;

/// Payload of tournament-wide events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentPayload {
    pub tournament: Tournament,
}

/// Payload of match events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPayload {
    #[serde(rename = "match")]
    pub game: MatchView,
}

/// Event pushed to a single connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerEvent {
    #[serde(rename = "tournament:started")]
    TournamentStarted(TournamentPayload),

    /// The recipient owns the next turn
    #[serde(rename = "match:require_move")]
    RequireMove(MatchPayload),

    #[serde(rename = "match:won")]
    MatchWon(MatchPayload),

    #[serde(rename = "match:lost")]
    MatchLost(MatchPayload),

    #[serde(rename = "match:draw")]
    MatchDraw(MatchPayload),

    #[serde(rename = "tournament:completed")]
    TournamentCompleted(TournamentPayload),
}

impl ServerEvent {
    pub fn tournament_started(tournament: Tournament) -> Self {
        ServerEvent::TournamentStarted(TournamentPayload { tournament })
    }

    pub fn tournament_completed(tournament: Tournament) -> Self {
        ServerEvent::TournamentCompleted(TournamentPayload { tournament })
    }

    pub fn require_move(game: MatchView) -> Self {
        ServerEvent::RequireMove(MatchPayload { game })
    }

    /// Terminal event for `side` given the final outcome, `None` while undecided
    pub fn match_result(outcome: Outcome, side: Turn, game: MatchView) -> Option<Self> {
        let payload = MatchPayload { game };
        match (outcome, outcome.winner()) {
            (Outcome::Undecided, _) => None,
            (Outcome::Draw, _) => Some(ServerEvent::MatchDraw(payload)),
            (_, Some(winner)) if winner == side => Some(ServerEvent::MatchWon(payload)),
            _ => Some(ServerEvent::MatchLost(payload)),
        }
    }

    /// Wire name of the event
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::TournamentStarted(_) => "tournament:started",
            ServerEvent::RequireMove(_) => "match:require_move",
            ServerEvent::MatchWon(_) => "match:won",
            ServerEvent::MatchLost(_) => "match:lost",
            ServerEvent::MatchDraw(_) => "match:draw",
            ServerEvent::TournamentCompleted(_) => "tournament:completed",
        }
    }
}
