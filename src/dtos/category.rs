// src/dtos/category.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub product_count: i32,
}

impl From<crate::models::category::Category> for CategoryResponse {
    fn from(category: crate::models::category::Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            product_count: category.product_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCategoriesResponse {
    pub message: String,
    pub added_categories: Vec<String>,
    pub all_categories: Vec<String>,
}
