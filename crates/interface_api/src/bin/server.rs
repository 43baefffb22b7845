//! Claims API - Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! PORT=8080 JWT_SECRET=... DATABASE_URL=postgres://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `PORT` / `API_PORT` - Server port (default: 5000)
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `JWT_SECRET` / `API_JWT_SECRET` - Token signing secret (required in production)
//! * `DATABASE_URL` / `API_DATABASE_URL` - PostgreSQL connection string
//! * `CORS_ORIGIN` / `API_CORS_ORIGIN` - Allowed origin (default: any)
//! * `APP_ENV` / `NODE_ENV` / `API_ENVIRONMENT` - `production` hides error detail
//! * `API_LOG_LEVEL`, `API_LOG_DIR` - Log filter and directory; `RUST_LOG` wins
//! * `API_RATE_LIMIT_MAX`, `API_RATE_LIMIT_WINDOW_SECS` - Per-address quota (default: 100 / 900)

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresClaimRepository};
use interface_api::{
    config::ApiConfig,
    create_router,
    logging::{init_logging, install_panic_hook},
    telemetry::PrometheusMetrics,
    AppState,
};

/// Loads configuration, installs logging, and runs the server until a
/// shutdown signal arrives. Any startup failure exits with status 1.
#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _guards = match init_logging(&config) {
        Ok(guards) => guards,
        Err(err) => {
            eprintln!("Failed to initialize logging: {err}");
            return ExitCode::FAILURE;
        }
    };
    install_panic_hook();

    match run(config).await {
        Ok(()) => {
            tracing::info!("Server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, stack = ?err, "Failed to start server");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ApiConfig) -> anyhow::Result<()> {
    tracing::info!(
        host = %config.host,
        port = %config.port,
        environment = %config.environment,
        "Starting claims API server"
    );

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone()).max_connections(config.db_max_connections),
    )
    .await
    .context("connecting to database")?;
    tracing::info!("Database connected successfully");

    run_migrations(&pool).await.context("running migrations")?;

    let metrics = PrometheusMetrics::new().context("building metrics recorder")?;
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    let state = AppState::new(
        Arc::new(PostgresClaimRepository::new(pool)),
        Arc::new(metrics),
        config,
    );
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "Server running on port {}", addr.port());

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving requests")?;

    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
