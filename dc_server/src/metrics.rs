//! Prometheus metrics for the tournament server.
//!
//! Metrics are exposed in Prometheus text format on `METRICS_BIND` when it is
//! set. Without an installed exporter every recording call is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use dc_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::websocket_connections_active(10);
//! ```

use duel_coordinator::MoveOutcome;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: usize) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}

/// Increment dropped push counter.
pub fn notifications_dropped() {
    metrics::counter!("notifications_dropped_total").increment(1);
}

// ============================================================================
// Tournament Metrics
// ============================================================================

/// Count matches created by a pairing round.
pub fn matches_created(count: usize) {
    metrics::counter!("matches_created_total").increment(count as u64);
}

/// Record an accepted move and, when it ended the match, its result.
pub fn move_accepted(outcome: &MoveOutcome) {
    metrics::counter!("moves_total").increment(1);

    if let MoveOutcome::Finished { winner } = outcome {
        metrics::counter!("matches_finished_total", "result" => winner.as_str())
            .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_coordinator::{Outcome, Turn};

    #[test]
    fn test_recording_without_exporter() {
        websocket_connections_active(3);
        notifications_dropped();
        matches_created(4);
        move_accepted(&MoveOutcome::Continued {
            next_turn: Turn::Player2,
        });
        move_accepted(&MoveOutcome::Finished {
            winner: Outcome::Draw,
        });
    }
}
