//! Product domain entity and related types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Product domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Product {
    /// Server-assigned identity
    #[cfg_attr(feature = "openapi", schema(example = 1))]
    pub id: i32,
    #[cfg_attr(feature = "openapi", schema(example = "Widget"))]
    pub name: String,
    pub description: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "9.99"))]
    pub price: Decimal,
    pub picture_url: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub brand: String,
    pub quantity_in_stock: i32,
}

impl Product {
    /// Apply a full replacement of every attribute except the identity.
    pub fn apply(&mut self, update: UpdateProduct) {
        self.name = update.name;
        self.description = update.description;
        self.price = update.price;
        self.picture_url = update.picture_url;
        self.product_type = update.product_type;
        self.brand = update.brand;
        self.quantity_in_stock = update.quantity_in_stock;
    }
}

/// Product creation data transfer object.
///
/// Any `id` in the request body is ignored; the store assigns one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateProduct {
    #[cfg_attr(feature = "openapi", schema(example = "Widget"))]
    pub name: String,
    pub description: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "9.99"))]
    pub price: Decimal,
    pub picture_url: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub brand: String,
    pub quantity_in_stock: i32,
}

impl CreateProduct {
    /// Materialize the product once the store has assigned an id.
    pub fn into_product(self, id: i32) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            picture_url: self.picture_url,
            product_type: self.product_type,
            brand: self.brand,
            quantity_in_stock: self.quantity_in_stock,
        }
    }
}

/// Product update data transfer object (full replacement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateProduct {
    /// Must equal the id in the request path
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "9.99"))]
    pub price: Decimal,
    #[serde(default)]
    pub picture_url: String,
    #[serde(rename = "type", default)]
    pub product_type: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub quantity_in_stock: i32,
}

impl UpdateProduct {
    /// Identity is immutable: the payload must address the same product as the path.
    pub fn ensure_targets(&self, path_id: i32) -> DomainResult<()> {
        if self.id != path_id {
            return Err(DomainError::cannot_update_product());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(id: i32) -> UpdateProduct {
        UpdateProduct {
            id,
            name: "Gadget".to_string(),
            description: "A gadget".to_string(),
            price: Decimal::new(1250, 2),
            picture_url: "images/gadget.png".to_string(),
            product_type: "Tools".to_string(),
            brand: "Acme".to_string(),
            quantity_in_stock: 3,
        }
    }

    #[test]
    fn test_ensure_targets_matching_id() {
        assert!(update(5).ensure_targets(5).is_ok());
    }

    #[test]
    fn test_ensure_targets_rejects_mismatch() {
        let err = update(6).ensure_targets(5).unwrap_err();
        assert_eq!(err, DomainError::cannot_update_product());
        assert_eq!(err.to_string(), "Cannot update this product");
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut product = CreateProduct::default().into_product(5);
        product.apply(update(5));

        assert_eq!(product.id, 5);
        assert_eq!(product.name, "Gadget");
        assert_eq!(product.price, Decimal::new(1250, 2));
        assert_eq!(product.quantity_in_stock, 3);
    }

    #[test]
    fn test_create_product_ignores_id_and_accepts_float_price() {
        let create: CreateProduct =
            serde_json::from_str(r#"{"id": 77, "name": "Widget", "price": 9.99}"#).unwrap();

        assert_eq!(create.name, "Widget");
        assert_eq!(create.price, Decimal::new(999, 2));
        assert_eq!(create.brand, "");
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let product = CreateProduct {
            picture_url: "images/w.png".to_string(),
            product_type: "Boards".to_string(),
            quantity_in_stock: 4,
            ..CreateProduct::default()
        }
        .into_product(1);

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["pictureUrl"], "images/w.png");
        assert_eq!(json["type"], "Boards");
        assert_eq!(json["quantityInStock"], 4);
    }
}
