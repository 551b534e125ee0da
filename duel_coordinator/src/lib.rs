//! # Duel Coordinator
//!
//! Matchmaking and turn arbitration for tournaments of 1-on-1 turn-based games.
//!
//! Players register for a tournament and receive a passkey, connect, signal
//! readiness and get paired round-robin. Moves go through the tournament's
//! pinned game engine, and every event a player must see is pushed to their
//! live session.
//!
//! ## Core Modules
//!
//! - [`game`]: pluggable, versioned game engines (`tictactoe@0.0.1` built in)
//! - [`session`]: which live connection reaches each user
//! - [`tournament`]: tournament lifecycle
//! - [`registry`]: per-player registration state machine
//! - [`matchmaking`]: pairing of ready players
//! - [`matches`]: match state machine and turn arbitration
//! - [`notify`]: realtime push events
//! - [`db`]: conditional-write storage, in memory or PostgreSQL
//! - [`coordinator`]: the operations exposed to a transport
//!
//! ## Example
//!
//! ```
//! use duel_coordinator::{Coordinator, MemoryTransport, TournamentConfig, TournamentStatus};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), duel_coordinator::CoordinatorError> {
//! let coordinator = Coordinator::in_memory(Arc::new(MemoryTransport::new()));
//!
//! let config = TournamentConfig::new("Friday Cup", "tictactoe@0.0.1".parse()?);
//! let tournament = coordinator.create_tournament("host", config).await?;
//! let tournament = coordinator.open_tournament(tournament.tournament_id, "host").await?;
//! assert_eq!(tournament.status, TournamentStatus::Open);
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod db;
pub mod error;
pub mod game;
pub mod matches;
pub mod matchmaking;
pub mod notify;
pub mod registry;
pub mod session;
pub mod tournament;

pub use coordinator::{Coordinator, ReadyOutcome, StartedTournament};
pub use error::{CoordinatorError, CoordinatorResult};
pub use game::{GameEngine, GameRef, GameRegistry, Outcome, Turn};
pub use matches::{Match, MatchId, MatchStatus, MatchView, MoveOutcome};
pub use notify::{DeliveryError, MemoryTransport, Notifier, ServerEvent, Transport};
pub use registry::{Passkey, PlayerRegistry, RegistryStatus};
pub use session::{ConnectionId, SessionDirectory, UserId};
pub use tournament::{Tournament, TournamentConfig, TournamentId, TournamentStatus};
