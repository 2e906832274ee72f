//! Product repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use common::{AppError, AppResult};
use domain::{CreateProduct, Product, UpdateProduct};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List every product ordered by id
    async fn list(&self) -> AppResult<Vec<Product>>;

    /// Find product by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Product>>;

    /// Check whether a product with this ID exists
    async fn exists(&self, id: i32) -> AppResult<bool>;

    /// Insert a new product; the store assigns the id
    async fn create(&self, product: CreateProduct) -> AppResult<Product>;

    /// Replace all attributes of an existing product
    async fn update(&self, product: UpdateProduct) -> AppResult<Product>;

    /// Delete product by ID, returning whether a row was removed
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

/// Concrete implementation of ProductRepository
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Product::from))
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let count = ProductEntity::find()
            .filter(product::Column::Id.eq(id))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn create(&self, product: CreateProduct) -> AppResult<Product> {
        let active_model = ActiveModel {
            id: NotSet,
            name: Set(product.name),
            description: Set(product.description),
            price: Set(product.price),
            picture_url: Set(product.picture_url),
            product_type: Set(product.product_type),
            brand: Set(product.brand),
            quantity_in_stock: Set(product.quantity_in_stock),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }

    async fn update(&self, product: UpdateProduct) -> AppResult<Product> {
        let active_model = ActiveModel {
            id: Set(product.id),
            name: Set(product.name),
            description: Set(product.description),
            price: Set(product.price),
            picture_url: Set(product.picture_url),
            product_type: Set(product.product_type),
            brand: Set(product.brand),
            quantity_in_stock: Set(product.quantity_in_stock),
        };

        let model = active_model.update(&self.db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = ProductEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}
