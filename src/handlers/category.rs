// src/handlers/category.rs
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::Error as SqlxError;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::dtos::category::{
    CategoryResponse, CreateCategoryRequest, SyncCategoriesResponse, UpdateCategoryRequest,
};
use crate::error::AppError;
use crate::models::category::Category;
use crate::state::AppState;

fn map_unique_violation(err: SqlxError, message: &str) -> AppError {
    match err {
        SqlxError::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            AppError::conflict(message)
        }
        other => other.into(),
    }
}

/// Set difference at the heart of category sync: names used by products that
/// have no category record yet. Drops empties, deduplicates, keeps the order
/// names were first seen in.
fn missing_names(used: &[String], existing: &[String]) -> Vec<String> {
    let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    used.iter()
        .filter(|name| {
            !name.is_empty() && !existing.contains(name.as_str()) && seen.insert(name.as_str())
        })
        .cloned()
        .collect()
}

// GET /categories - name ascending, productCount recomputed from live products
pub async fn get_categories(
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT c.id, c.name, c.description, COUNT(p.id)::INT AS product_count \
         FROM categories c \
         LEFT JOIN products p ON p.category = c.name \
         GROUP BY c.id, c.name, c.description \
         ORDER BY c.name ASC",
    )
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

// POST /categories
pub async fn create_category(
    State(AppState { db_pool, .. }): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Category name is required"));
    }

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, description, product_count) \
         VALUES ($1, $2, $3, 0) \
         RETURNING id, name, description, product_count",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(payload.name.trim())
    .bind(&payload.description)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "Category name already exists"))?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

// PUT /categories - id comes in the body
pub async fn update_category(
    State(AppState { db_pool, .. }): State<AppState>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    if payload.id.is_empty() {
        return Err(AppError::validation("Category ID is required"));
    }

    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $1, description = $2 \
         WHERE id = $3 RETURNING id, name, description, product_count",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(&payload.id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "Category name already exists"))?
    .ok_or_else(|| AppError::not_found("Category not found"))?;

    Ok(Json(CategoryResponse::from(category)))
}

// DELETE /categories?id= - blocked while any product still uses the name
pub async fn delete_category(
    Query(params): Query<HashMap<String, String>>,
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let id = params
        .get("id")
        .ok_or_else(|| AppError::validation("Category ID is required"))?;

    let name = sqlx::query_scalar::<_, String>("SELECT name FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

    let referenced = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM products WHERE category = $1)",
    )
    .bind(&name)
    .fetch_one(&db_pool)
    .await?;

    if referenced {
        return Err(AppError::validation(
            "Bu kategoriye ait ürünler bulunduğu için silinemez.",
        ));
    }

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

// POST /categories/sync - create category records for names only present on
// products. Each insert is independent; a failure aborts the remainder but
// keeps what was already created (idempotent on re-run).
pub async fn sync_categories(
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<SyncCategoriesResponse>, AppError> {
    let used = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM products WHERE category IS NOT NULL AND category <> ''",
    )
    .fetch_all(&db_pool)
    .await?;

    let existing = sqlx::query_scalar::<_, String>("SELECT name FROM categories")
        .fetch_all(&db_pool)
        .await?;

    let missing = missing_names(&used, &existing);

    for name in &missing {
        sqlx::query("INSERT INTO categories (id, name, description, product_count) VALUES ($1, $2, $3, 0)")
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .bind(format!("{name} kategorisi (otomatik oluşturuldu)"))
            .execute(&db_pool)
            .await?;
    }

    tracing::info!(added = missing.len(), "Category sync completed");

    Ok(Json(SyncCategoriesResponse {
        message: format!("{} kategori eklendi", missing.len()),
        added_categories: missing,
        all_categories: used,
    }))
}
