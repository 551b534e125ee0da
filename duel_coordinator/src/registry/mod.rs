//! Player registrations: per (tournament, player) status, passkey and score.

pub mod manager;
pub mod models;

pub use manager::RegistryManager;
pub use models::{Passkey, PlayerRegistry, RegistryStatus, ScoreColumn, generate_passkey};
