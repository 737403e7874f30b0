// src/handlers/product.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::dtos::product::{
    encode_images, CreateProductRequest, ProductResponse, UpdateProductRequest,
};
use crate::error::AppError;
use crate::models::product::Product;
use crate::state::AppState;
use sqlx::Error as SqlxError;
use tracing::{error, instrument};

fn map_unique_violation(err: SqlxError, message: &str) -> AppError {
    match err {
        SqlxError::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            AppError::validation(message)
        }
        other => other.into(),
    }
}

const PRODUCT_COLUMNS: &str = "id, code, name, brand, color, category, model, description, \
     purchase_price, sale_price, suggested_sale_price, images, in_stock, barcode, \
     created_at, updated_at";

/// Next display code: max existing numeric code + 1, zero-padded to 3 digits.
/// An empty catalog starts at "001".
fn next_code(last_code: Option<&str>) -> String {
    let next = last_code
        .and_then(|code| code.trim().parse::<u32>().ok())
        .map_or(1, |n| n + 1);
    format!("{:03}", next)
}

// GET /products - List all products, newest first
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    match sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
    ))
    .fetch_all(&state.db_pool)
    .await
    {
        Ok(products) => {
            let response = products.into_iter().map(ProductResponse::from).collect();
            Ok(Json(response))
        }
        Err(e) => {
            error!(?e, "Failed to fetch products");
            Err(e.into())
        }
    }
}

// POST /products - Create new product with auto-assigned code
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let last_code = sqlx::query_scalar::<_, String>(
        "SELECT code FROM products ORDER BY code DESC LIMIT 1",
    )
    .fetch_optional(&state.db_pool)
    .await?;

    let code = next_code(last_code.as_deref());
    let now = Utc::now();

    let product = sqlx::query_as::<_, Product>(&format!(
        "INSERT INTO products \
         (id, code, name, brand, color, category, model, description, \
          purchase_price, sale_price, suggested_sale_price, images, in_stock, \
          created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, TRUE, $13, $13) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(&code)
    .bind(&payload.name)
    .bind(&payload.brand)
    .bind(&payload.color)
    .bind(&payload.category)
    .bind(&payload.model)
    .bind(&payload.description)
    .bind(payload.purchase_price)
    .bind(payload.sale_price)
    .bind(payload.suggested_sale_price)
    .bind(encode_images(&payload.images))
    .bind(now)
    .fetch_one(&state.db_pool)
    .await
    // Two concurrent creates can race past the max-code read
    .map_err(|e| map_unique_violation(e, "Bu ürün kodu zaten kullanılıyor!"))?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

// PUT /products/:id - Update product (full field set from the edit form)
#[instrument(skip(state, payload), fields(id))]
pub async fn update_product(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    // Code must stay unique across all other products
    let code_taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM products WHERE code = $1 AND id <> $2)",
    )
    .bind(&payload.code)
    .bind(&id)
    .fetch_one(&state.db_pool)
    .await?;

    if code_taken {
        return Err(AppError::validation("Bu ürün kodu zaten kullanılıyor!"));
    }

    let product = sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET \
         code = $1, name = $2, brand = $3, color = $4, category = $5, \
         purchase_price = $6, sale_price = $7, in_stock = $8, description = $9, \
         images = $10, updated_at = $11 \
         WHERE id = $12 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(&payload.code)
    .bind(&payload.name)
    .bind(&payload.brand)
    .bind(&payload.color)
    .bind(&payload.category)
    .bind(payload.purchase_price)
    .bind(payload.sale_price)
    .bind(payload.in_stock)
    .bind(&payload.description)
    .bind(encode_images(&payload.images))
    .bind(Utc::now())
    .bind(&id)
    .fetch_optional(&state.db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "Bu ürün kodu zaten kullanılıyor!"))?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductResponse::from(product)))
}

// DELETE /products/:id - Delete product unless transactions reference it
#[instrument(skip(state), fields(id))]
pub async fn delete_product(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    delete_product_by_id(&state, &id).await
}

// DELETE /products?id= - Same deletion, query-parameter form
#[instrument(skip(state, params))]
pub async fn delete_product_by_query(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let id = params
        .get("id")
        .ok_or_else(|| AppError::validation("Product ID is required"))?;
    delete_product_by_id(&state, id).await
}

async fn delete_product_by_id(state: &AppState, id: &str) -> Result<Json<Value>, AppError> {
    // Referential guard: sale history pins the product
    let referenced = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM transactions WHERE product_id = $1)",
    )
    .bind(id)
    .fetch_one(&state.db_pool)
    .await?;

    if referenced {
        return Err(AppError::validation(
            "Bu ürünün satış geçmişi bulunduğu için silinemez.",
        ));
    }

    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Product not found"));
    }

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
