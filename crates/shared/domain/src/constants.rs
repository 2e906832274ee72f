//! Domain-level constants.
//!
//! User-visible messages for catalog rule violations.

// =============================================================================
// Products
// =============================================================================

/// Returned when a product lookup by id finds nothing
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Returned when an update targets a mismatched or missing product
pub const CANNOT_UPDATE_PRODUCT: &str = "Cannot update this product";
