use sqlx::FromRow;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, FromRow)]
pub struct Product {
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
    // JSON array of image references, kept as raw text until the DTO boundary
    pub images: String,
    pub in_stock: bool,
    pub barcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
