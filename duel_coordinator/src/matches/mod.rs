//! Matches: WAITING -> ONGOING -> FINISHED, with turn arbitration delegated to
//! the tournament's game engine.

pub mod manager;
pub mod models;

pub use manager::{MatchManager, MoveOutcome};
pub use models::{Match, MatchId, MatchStatus, MatchView, score_for};
