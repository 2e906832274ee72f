//! Domain layer - Core catalog entities.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod constants;
pub mod error;
pub mod product;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use product::{CreateProduct, Product, UpdateProduct};
pub use rust_decimal::Decimal;
