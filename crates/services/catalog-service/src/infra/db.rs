//! Database connection and initialization.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use common::DatabaseConfig;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, Statement,
};
use sea_orm_migration::MigratorTrait;

use super::migrations::Migrator;
use super::readiness::{self, ReadinessError, RetryPolicy};
use crate::config::MAINTENANCE_DATABASE;

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// One migrate-and-connect attempt: open the pool, then apply pending migrations.
    ///
    /// If the server is up but the target database does not exist yet, it is
    /// created through the maintenance database first. Already-applied
    /// migrations are skipped, so repeating this is harmless.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let connection = match SeaDatabase::connect(connect_options(config)).await {
            Ok(connection) => connection,
            Err(err) if readiness::is_unknown_database(&err) => {
                create_database(config).await?;
                SeaDatabase::connect(connect_options(config)).await?
            }
            Err(err) => return Err(err),
        };

        // Run pending migrations
        Migrator::up(&connection, None).await?;
        tracing::info!("Database connected and migrations applied");

        Ok(Self { connection })
    }

    /// Run the startup readiness sequence until the database is migrated and live.
    pub async fn connect_with_retry<S>(
        config: &DatabaseConfig,
        policy: &RetryPolicy,
        shutdown: S,
    ) -> Result<Self, ReadinessError>
    where
        S: Future<Output = ()>,
    {
        readiness::wait_until_ready_or_shutdown(policy, || Self::connect(config), shutdown).await
    }

    /// Connect without running migrations (for CLI commands).
    pub async fn connect_without_migrations(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let connection = SeaDatabase::connect(connect_options(config)).await?;
        Ok(Self { connection })
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Run pending migrations.
    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Rollback the last migration.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Get migration status (list all migrations with applied status).
    pub async fn migration_status(&self) -> Result<Vec<(String, bool)>, DbErr> {
        use sea_orm::{EntityTrait, QueryOrder};
        use sea_orm_migration::seaql_migrations;

        let applied: std::collections::HashSet<String> = seaql_migrations::Entity::find()
            .order_by_asc(seaql_migrations::Column::Version)
            .all(&self.connection)
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();

        Ok(Migrator::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                let is_applied = applied.contains(&name);
                (name, is_applied)
            })
            .collect())
    }

    /// Reset database and run all migrations fresh.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}

/// Issue `CREATE DATABASE` for the configured database on the server's
/// maintenance database.
async fn create_database(config: &DatabaseConfig) -> Result<(), DbErr> {
    let (name, maintenance_url) = split_database_url(&config.url).ok_or_else(|| {
        DbErr::Custom("connection string does not name a database".to_string())
    })?;

    tracing::info!(database = %name, "Database does not exist, creating it");

    let mut options = ConnectOptions::new(maintenance_url);
    options
        .max_connections(1)
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .sqlx_logging(false);
    let maintenance = SeaDatabase::connect(options).await?;

    let created = maintenance
        .execute(Statement::from_string(
            maintenance.get_database_backend(),
            format!("CREATE DATABASE {}", quote_identifier(&name)),
        ))
        .await;
    maintenance.close().await?;

    match created {
        Ok(_) => Ok(()),
        Err(err) if readiness::is_duplicate_database(&err) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Split a connection string into the database name and the same URL
/// pointed at the maintenance database. Query parameters are kept.
fn split_database_url(url: &str) -> Option<(String, String)> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    };

    let authority = base.find("://")? + 3;
    let slash = authority + base[authority..].find('/')?;
    let name = &base[slash + 1..];
    if name.is_empty() || name.contains('/') {
        return None;
    }

    let mut maintenance = format!("{}/{}", &base[..slash], MAINTENANCE_DATABASE);
    if let Some(query) = query {
        maintenance.push('?');
        maintenance.push_str(query);
    }

    Some((name.to_string(), maintenance))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .sqlx_logging(false);
    options
}

/// Liveness probe used by the health endpoint.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), DbErr>;
}

#[async_trait]
impl HealthCheck for Database {
    async fn ping(&self) -> Result<(), DbErr> {
        Database::ping(self).await
    }
}
