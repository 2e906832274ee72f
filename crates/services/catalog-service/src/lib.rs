//! Catalog Service Library
//!
//! HTTP CRUD API over the `products` table. Before the listener is bound,
//! the startup readiness sequence waits for the database to accept
//! connections and applies pending migrations; if it never becomes ready the
//! process exits without serving traffic.

pub mod api;
pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::net::SocketAddr;

use tokio::signal;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::CatalogServiceConfig;
use crate::infra::{Database, RetryPolicy};

/// Run readiness, then serve HTTP until a shutdown signal arrives.
pub async fn run_server(config: CatalogServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(service = %config.server.service_name, "Starting server...");

    // Exclusive use of the database until readiness completes
    let db =
        Database::connect_with_retry(&config.database, &RetryPolicy::default(), shutdown_signal())
            .await?;

    let state = AppState::from_database(db);
    let app = create_router(state);

    let addr: SocketAddr = config.server.addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Catalog service listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Run migrations (for CLI commands). No readiness retry here.
pub async fn run_migrations(
    action: MigrateAction,
    config: CatalogServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            info!("Running pending migrations...");
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            info!("Rolling back last migration...");
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            warn!("Resetting database and running all migrations...");
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
