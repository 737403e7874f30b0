// src/dtos/transaction.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::models::transaction::{Transaction, TransactionKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    pub product_id: Option<String>,
    // Economic date; defaults to the creation instant when omitted
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    pub product_id: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            kind: TransactionKind::from_db(&transaction.kind),
            amount: transaction.amount,
            description: transaction.description,
            category: transaction.category,
            product_id: transaction.product_id,
            date: transaction.date,
            created_at: transaction.created_at,
        }
    }
}
