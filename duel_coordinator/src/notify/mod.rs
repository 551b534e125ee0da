//! Realtime notifier: routes domain events to the live session of a player.

pub mod events;
pub mod notifier;

pub use events::{MatchPayload, ServerEvent, TournamentPayload};
pub use notifier::{DeliveryError, MemoryTransport, Notifier, Transport};
