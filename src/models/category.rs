use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    // Denormalized; list reads recompute it live from product rows
    pub product_count: i32,
}
