//! Matchmaking: round-robin pairing of ready players.

pub mod engine;
pub mod pairing;

pub use engine::MatchmakingEngine;
pub use pairing::{Candidate, ordered_pairs, plan_round};
