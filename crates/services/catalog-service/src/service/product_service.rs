//! Product service - Handles product-related use cases.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{CreateProduct, DomainError, Product, UpdateProduct, PRODUCT_NOT_FOUND};

use crate::repository::ProductRepository;

/// Product service trait for dependency injection.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// List all products
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    /// Get product by ID
    async fn get_product(&self, id: i32) -> AppResult<Product>;

    /// Create a new product
    async fn create_product(&self, product: CreateProduct) -> AppResult<Product>;

    /// Replace an existing product; `id` comes from the request path
    async fn update_product(&self, id: i32, product: UpdateProduct) -> AppResult<()>;

    /// Delete product by ID
    async fn delete_product(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of ProductService using repository.
pub struct ProductManager {
    repo: Arc<dyn ProductRepository>,
}

impl ProductManager {
    /// Create new product service instance with repository
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ProductService for ProductManager {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.repo.list().await
    }

    async fn get_product(&self, id: i32) -> AppResult<Product> {
        self.repo.find_by_id(id).await?.ok_or_not_found(PRODUCT_NOT_FOUND)
    }

    async fn create_product(&self, product: CreateProduct) -> AppResult<Product> {
        let created = self.repo.create(product).await?;
        tracing::debug!(product_id = created.id, "Product created");
        Ok(created)
    }

    async fn update_product(&self, id: i32, product: UpdateProduct) -> AppResult<()> {
        product.ensure_targets(id)?;

        if !self.repo.exists(id).await? {
            return Err(DomainError::cannot_update_product().into());
        }

        self.repo.update(product).await?;
        Ok(())
    }

    async fn delete_product(&self, id: i32) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::from(DomainError::product_not_found()));
        }

        tracing::debug!(product_id = id, "Product deleted");
        Ok(())
    }
}
