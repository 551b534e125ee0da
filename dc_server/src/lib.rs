//! HTTP and WebSocket front end of the duel tournament coordinator.
//!
//! REST endpoints manage tournaments and registrations; a WebSocket per
//! player carries ready signals, moves and pushed events.

pub mod api;
pub mod config;
pub mod hub;
pub mod logging;
pub mod metrics;
