//! Research desk authentication server.
//!
//! Connects to PostgreSQL, applies migrations, and serves the auth API until
//! Ctrl+C, then drains in-flight requests and closes the pool.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Error};
use pico_args::Arguments;
use rd_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use research_desk::{
    auth::{AuthService, PasswordHasher, TokenIssuer},
    db::{Database, PgCredentialStore},
};
use tracing::info;

const HELP: &str = "\
Run the research desk authentication server

USAGE:
  rd_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND, PORT or 127.0.0.1:5000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or POSTGRES_URI]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:5000)
  PORT                     Port on 127.0.0.1 when SERVER_BIND is unset
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               Session token signing secret (required, 32+ chars)
  TOKEN_VALIDITY_HOURS     Session token lifetime [default: 24]
  CORS_ALLOWED_ORIGINS     Comma separated browser origins
  METRICS_BIND             Prometheus listener address (optional)
  (See .env.example for all configuration options)
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
    config.validate()?;
    info!("Loaded configuration: {:?}", config.security);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics available at http://{}/metrics", addr);
    }

    info!("Connecting to database: {}", config.database.redacted_url());
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    info!("Database connected and migrated");

    let auth = AuthService::new(
        Arc::new(PgCredentialStore::new(db.pool().clone())),
        PasswordHasher::new(config.security.hash_cost)?,
        TokenIssuer::with_validity(&config.security.jwt_secret, config.security.token_validity()),
    );

    let app = api::create_router(AppState::new(auth), &config.cors);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
