//! Structured logging configuration.
//!
//! The coordinator library logs through the `log` facade; `init` installs a
//! `tracing` subscriber that also captures those records.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use dc_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `user_id` - User the event concerns, if known
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use dc_server::logging::log_security_event;
///
/// log_security_event("invalid_token", None, "Bearer token rejected");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id,
        "SECURITY: {}",
        message
    );
}

/// Log a completed WebSocket session
pub fn log_connection_closed(connection_id: &str, frames_received: u64, registries_reset: usize) {
    tracing::info!(
        connection_id = connection_id,
        frames_received = frames_received,
        registries_reset = registries_reset,
        "WebSocket session closed"
    );
}
