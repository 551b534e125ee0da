//! Tournament lifecycle: CREATED -> OPEN -> STARTED -> COMPLETED.
//!
//! Every transition is requested by the tournament's creator and applied with a
//! conditional write on the current status, so the status never moves backward.

pub mod manager;
pub mod models;

pub use manager::{MIN_READY_PLAYERS, TournamentManager};
pub use models::{Tournament, TournamentConfig, TournamentId, TournamentStatus};
