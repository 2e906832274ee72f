//! Application state for dependency injection.

use std::sync::Arc;

use crate::infra::{Database, HealthCheck};
use crate::repository::ProductStore;
use crate::service::{ProductManager, ProductService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Product use cases
    pub product_service: Arc<dyn ProductService>,
    /// Database liveness probe
    pub database: Arc<dyn HealthCheck>,
}

impl AppState {
    /// Wire the production services over a ready database.
    pub fn from_database(database: Database) -> Self {
        let product_repo = Arc::new(ProductStore::new(database.get_connection()));
        let product_service = Arc::new(ProductManager::new(product_repo));

        Self::new(product_service, Arc::new(database))
    }

    /// Create new app state with manually injected services.
    pub fn new(product_service: Arc<dyn ProductService>, database: Arc<dyn HealthCheck>) -> Self {
        Self {
            product_service,
            database,
        }
    }
}
