//! Service settings loaded from environment variables.

use std::env;

use common::{DatabaseConfig, ServiceConfig};

use super::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, SERVICE_NAME,
};

/// Catalog service configuration.
#[derive(Debug, Clone)]
pub struct CatalogServiceConfig {
    /// Listener settings
    pub server: ServiceConfig,
    /// Connection string and pool settings
    pub database: DatabaseConfig,
}

impl CatalogServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server: ServiceConfig {
                service_name: SERVICE_NAME.to_string(),
                host: env::var("CATALOG_SERVICE_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env::var("CATALOG_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
            },
            database: DatabaseConfig {
                url: env::var("CATALOG_SERVICE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MIN_CONNECTIONS),
                connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            },
        }
    }

    /// Override the listener address (CLI flags win over the environment).
    pub fn with_listener(mut self, host: String, port: u16) -> Self {
        self.server.host = host;
        self.server.port = port;
        self
    }
}

impl Default for CatalogServiceConfig {
    fn default() -> Self {
        Self {
            server: ServiceConfig {
                service_name: SERVICE_NAME.to_string(),
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
                min_connections: DEFAULT_MIN_CONNECTIONS,
                connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            },
        }
    }
}
