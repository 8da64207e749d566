//! taskdesk HTTP server.
//!
//! Reads configuration from the environment (and `.env`), opens the `SQLite`
//! pool, resolves the task table layout and serves the API until SIGINT or
//! SIGTERM.

use std::process::ExitCode;
use std::sync::Arc;

use taskdesk::config::{AppConfig, ConfigError};
use taskdesk::http::{AppState, router};
use taskdesk::task::adapters::sqlite::{SqliteTaskRepository, build_pool};
use taskdesk::task::ports::{TaskRepository, TaskRepositoryError};
use taskdesk::task::services::TaskService;
use taskdesk::telemetry;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("task store error: {0}")]
    Store(#[from] TaskRepositoryError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    if let Err(error) = telemetry::init() {
        tracing::warn!(%error, "tracing subscriber already installed");
    }
    match dotenv {
        Err(error) if !error.not_found() => {
            tracing::warn!(%error, "failed to load .env file");
        }
        _ => {}
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "taskdesk stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        database_url = %config.database_url,
        address = %config.bind_address,
        layout_policy = ?config.layout_policy,
        "starting taskdesk"
    );

    let pool = build_pool(&config.database_url, config.pool_size)?;
    let repository = SqliteTaskRepository::with_policy(pool, config.layout_policy);

    if config.auto_migrate && repository.bootstrap_schema().await? {
        tracing::info!("task table created");
    }

    match repository.resolve_layout().await {
        Ok(layout) => tracing::info!(%layout, "task table layout resolved"),
        Err(TaskRepositoryError::UnrecognizedSchema(schema)) => tracing::warn!(
            columns = %schema.columns_list(),
            "task table layout not recognized; data requests will fail until it is fixed"
        ),
        Err(error) => return Err(error.into()),
    }

    let repository: Arc<dyn TaskRepository> = Arc::new(repository);
    let application = router(
        AppState::new(TaskService::new(repository)),
        config.cors_origins,
    );

    let listener = TcpListener::bind(config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Completes on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
