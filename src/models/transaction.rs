use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

/// Canonical transaction type used by all business logic. The persisted
/// vocabulary is Turkish ("gelir"/"gider"); translation happens only at the
/// read/write boundary via `as_db`/`from_db`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_db(self) -> &'static str {
        match self {
            TransactionKind::Income => "gelir",
            TransactionKind::Expense => "gider",
        }
    }

    /// Anything that is not "gelir" decodes as an expense, matching the
    /// two-branch handling the existing data was written under.
    pub fn from_db(value: &str) -> Self {
        if value == "gelir" {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    pub id: String,
    // "type" column, selected with an alias; stored vocabulary, not the enum
    pub kind: String,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    pub product_id: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
