//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::api::handlers::product_handler;
use domain::{CreateProduct, Product, UpdateProduct};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog Service",
        description = "Product catalog CRUD API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        product_handler::list_products,
        product_handler::get_product,
        product_handler::create_product,
        product_handler::update_product,
        product_handler::delete_product,
    ),
    components(
        schemas(
            Product,
            CreateProduct,
            UpdateProduct,
        )
    ),
    tags(
        (name = "Products", description = "Product catalog operations"),
    )
)]
pub struct ApiDoc;
