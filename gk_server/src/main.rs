//! Session authentication server.
//!
//! Serves the credential and session API over HTTP with Postgres-backed
//! storage and cookie-carried bearer tokens.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use gatekeeper::{
    auth::Authority,
    db::{Database, PgSessionStore, PgUserStore},
};
use gk_server::{api, config::ServerConfig, logging};
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run a session authentication server

USAGE:
  gk_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string (required)
  PASSWORD_PEPPER          Password hashing pepper (required, min 16 chars)
  COOKIE_SECURE            Set to `false` to issue cookies without the Secure
                           attribute (plain-HTTP development only)
  (See .env file for all configuration options)
";

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

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, database_url_override)?;
    info!("Starting session authentication server at {}", config.bind);

    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    db.ensure_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare schema: {}", e))?;
    info!("Database connected successfully");

    let pool = db.pool().clone();
    let authority = Arc::new(Authority::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgSessionStore::new(pool)),
        config.security.password_pepper.clone(),
    ));

    let secure_cookies = std::env::var("COOKIE_SECURE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(true);

    let app = api::create_router(api::AppState {
        authority,
        store_health: Arc::new(db.clone()),
        secure_cookies,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {e}");
    }
}
