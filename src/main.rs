mod common;
mod config;
mod gbif;
mod routes;
mod whales;

use crate::common::state::AppState;
use crate::config::Config;
use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration and environment variables to pass to the application
    let config: Config = Config::from_env()?;

    let db: DatabaseConnection = Database::connect(config.db_url.as_str())
        .await
        .context("Could not connect to the database")?;
    tracing::info!("Connected to the database");

    Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("DB migrations complete");

    tracing::info!(
        app = %config.app_name,
        deployment = %config.deployment.to_uppercase(),
        use_test_data = config.use_test_data,
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str())
        .await
        .with_context(|| format!("Could not bind {}", config.bind_addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let state = AppState::new(db, config).context("Could not build the GBIF client")?;
    let router = routes::build_router(&state);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let a running background sync finish its transaction before exiting
    if let Some(job) = state.sync_jobs.join_current().await {
        tracing::info!(job_id = %job.job_id, status = ?job.status, "Background sync settled");
    }
    state.db.close().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
