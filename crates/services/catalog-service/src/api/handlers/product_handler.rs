//! Product handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use common::AppResult;
use domain::{CreateProduct, Product, UpdateProduct};

use crate::api::extractors::{AppJson, AppPath};
use crate::api::state::AppState;

/// Create product routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// List all products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 200, description = "List of all products", body = Vec<Product>)
    )
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.product_service.list_products().await?;
    Ok(Json(products))
}

/// Get product by ID
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Product>> {
    let product = state.product_service.get_product(id).await?;
    Ok(Json(product))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Malformed request body")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state.product_service.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 204, description = "Product updated"),
        (status = 400, description = "Cannot update this product")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateProduct>,
) -> AppResult<StatusCode> {
    state.product_service.update_product(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.product_service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
