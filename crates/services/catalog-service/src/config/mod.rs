//! Catalog service configuration.
//!
//! Handles environment variables and service-wide constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::CatalogServiceConfig;
