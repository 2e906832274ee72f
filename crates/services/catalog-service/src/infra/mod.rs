//! Infrastructure layer - database, migrations and startup readiness.

mod db;
pub mod migrations;
pub mod readiness;

pub use db::{Database, HealthCheck};
pub use migrations::Migrator;
pub use readiness::{AttemptError, ReadinessError, RetryPolicy};
