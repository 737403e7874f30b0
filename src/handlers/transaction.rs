// src/handlers/transaction.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dtos::transaction::{
    CreateTransactionRequest, TransactionResponse, UpdateTransactionRequest,
};
use crate::error::AppError;
use crate::models::transaction::Transaction;
use crate::state::AppState;

const TRANSACTION_COLUMNS: &str =
    "id, type AS kind, amount, description, category, product_id, date, created_at";

// GET /transactions - canonical display order: date desc, then created_at desc
pub async fn get_transactions(
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let transactions = sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions \
         ORDER BY date DESC, created_at DESC"
    ))
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}

// POST /transactions - date defaults to the creation instant
pub async fn create_transaction(
    State(AppState { db_pool, .. }): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    if payload.amount < 0.0 {
        return Err(AppError::validation("Amount cannot be negative"));
    }

    let now = Utc::now();
    let transaction = sqlx::query_as::<_, Transaction>(&format!(
        "INSERT INTO transactions (id, type, amount, description, category, product_id, date, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {TRANSACTION_COLUMNS}"
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(payload.kind.as_db())
    .bind(payload.amount)
    .bind(&payload.description)
    .bind(&payload.category)
    .bind(&payload.product_id)
    .bind(payload.date.unwrap_or(now))
    .bind(now)
    .fetch_one(&db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(TransactionResponse::from(transaction))))
}

// PUT /transactions/:id
pub async fn update_transaction(
    Path(id): Path<String>,
    State(AppState { db_pool, .. }): State<AppState>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    if payload.amount < 0.0 {
        return Err(AppError::validation("Amount cannot be negative"));
    }

    let transaction = sqlx::query_as::<_, Transaction>(&format!(
        "UPDATE transactions SET type = $1, amount = $2, description = $3, date = $4 \
         WHERE id = $5 RETURNING {TRANSACTION_COLUMNS}"
    ))
    .bind(payload.kind.as_db())
    .bind(payload.amount)
    .bind(&payload.description)
    .bind(payload.date.unwrap_or_else(Utc::now))
    .bind(&id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Transaction not found"))?;

    Ok(Json(TransactionResponse::from(transaction)))
}

// DELETE /transactions/:id - no referential guards on this side
pub async fn delete_transaction(
    Path(id): Path<String>,
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
        .bind(&id)
        .execute(&db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Transaction not found"));
    }

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
