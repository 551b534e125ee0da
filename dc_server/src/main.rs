//! Duel tournament server.
//!
//! Serves the REST API and player WebSockets over one coordinator, backed by
//! in-memory or PostgreSQL storage.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use dc_server::{
    api::{AppState, auth::TokenVerifier, create_router},
    config::{ServerConfig, StorageBackend},
    hub::ConnectionHub,
    logging, metrics,
};
use duel_coordinator::{
    Coordinator, GameRegistry, SessionDirectory,
    db::{Database, MemoryStore, PgStore, Store},
    session::PgSessionStore,
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a duel tournament server

USAGE:
  dc_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --storage    BACKEND     memory or postgres          [default: env STORAGE_BACKEND or memory]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  STORAGE_BACKEND          memory or postgres
  DATABASE_URL             PostgreSQL connection string
  DB_MAX_CONNECTIONS       Pool size (and the other DB_* pool settings)
  JWT_SECRET               Bearer token signing secret (required, 32+ chars)
  METRICS_BIND             Prometheus exporter address (optional)
  OUTBOUND_BUFFER          Frames buffered per WebSocket [default: 32]
  RUST_LOG                 Log filter
";

struct Args {
    bind: Option<SocketAddr>,
    storage: Option<StorageBackend>,
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        storage: pargs.opt_value_from_str("--storage")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.storage)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exported at {}", addr);
    }

    let (store, sessions, database): (Arc<dyn Store>, SessionDirectory, Option<Arc<Database>>) =
        match config.storage {
            StorageBackend::Memory => {
                info!("Using in-memory storage; state is lost on restart");
                (
                    Arc::new(MemoryStore::new()),
                    SessionDirectory::in_memory(),
                    None,
                )
            }
            StorageBackend::Postgres => {
                info!("Connecting to database");
                let db = Database::new(&config.database)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
                db.migrate()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
                info!("Database connected successfully");

                let pool = Arc::new(db.pool().clone());
                (
                    Arc::new(PgStore::new(pool.clone())),
                    SessionDirectory::new(Arc::new(PgSessionStore::new(pool))),
                    Some(Arc::new(db)),
                )
            }
        };

    let games = GameRegistry::with_builtin_games();
    for game in games.games() {
        info!("Game engine available: {}", game);
    }

    let hub = Arc::new(ConnectionHub::new());
    let coordinator = Arc::new(Coordinator::new(store, sessions, games, hub.clone()));

    let state = AppState {
        coordinator,
        hub,
        tokens: Arc::new(TokenVerifier::new(config.security.jwt_secret.clone())),
        database: database.clone(),
        outbound_buffer: config.outbound_buffer,
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        "Duel tournament server listening at {} ({} storage)",
        config.bind, config.storage
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.pool().close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
