//! Catalog Service - HTTP API for the product catalog.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_service_lib::config::{CatalogServiceConfig, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};
use catalog_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "catalog-service")]
#[command(author, version, about = "Product catalog microservice", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for the database, then start the HTTP server
    Serve {
        #[arg(long, default_value = DEFAULT_SERVER_HOST, env = "CATALOG_SERVICE_HOST")]
        host: String,
        #[arg(long, default_value_t = DEFAULT_SERVER_PORT, env = "CATALOG_SERVICE_PORT")]
        port: u16,
    },
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = CatalogServiceConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");

    let result = match cli.command {
        Commands::Serve { host, port } => {
            catalog_service_lib::run_server(config.with_listener(host, port)).await
        }
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            catalog_service_lib::run_migrations(migrate_action, config).await
        }
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,tower_http=debug".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_listener_defaults() {
        let cli = Cli::try_parse_from(["catalog-service", "serve"]).unwrap();

        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, DEFAULT_SERVER_HOST);
                assert_eq!(port, DEFAULT_SERVER_PORT);
            }
            Commands::Migrate { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::try_parse_from(["catalog-service", "serve", "--port", "9090"]).unwrap();

        assert!(matches!(cli.command, Commands::Serve { port: 9090, .. }));
    }
}
