// src/dtos/product.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub brand: String,
    pub color: String,
    pub category: String,
    pub model: Option<String>,
    pub description: Option<String>,
    pub purchase_price: f64,
    pub sale_price: f64,
    pub suggested_sale_price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

// Full field set, matching what the edit form submits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub code: String,
    pub name: String,
    pub brand: String,
    pub color: String,
    pub category: String,
    pub purchase_price: f64,
    pub sale_price: f64,
    pub in_stock: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub brand: String,
    pub color: String,
    pub category: String,
    pub model: Option<String>,
    pub description: Option<String>,
    pub purchase_price: f64,
    pub sale_price: f64,
    pub suggested_sale_price: Option<f64>,
    pub images: Vec<String>,
    pub in_stock: bool,
    pub barcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Convert from Model to Response DTO
impl From<crate::models::product::Product> for ProductResponse {
    fn from(product: crate::models::product::Product) -> Self {
        Self {
            id: product.id,
            code: product.code,
            name: product.name,
            brand: product.brand,
            color: product.color,
            category: product.category,
            model: product.model,
            description: product.description,
            purchase_price: product.purchase_price,
            sale_price: product.sale_price,
            suggested_sale_price: product.suggested_sale_price,
            images: decode_images(&product.images),
            in_stock: product.in_stock,
            barcode: product.barcode,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// The images column holds a JSON-serialized array of references. Malformed
/// text decodes as an empty list rather than failing the whole read.
pub fn decode_images(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub fn encode_images(images: &[String]) -> String {
    serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string())
}
