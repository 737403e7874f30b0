use axum::{
    routing::{get, put},
    Router,
};
use crate::handlers::transaction::{
    get_transactions, create_transaction, update_transaction, delete_transaction
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(get_transactions).post(create_transaction))
        .route("/transactions/{id}", put(update_transaction).delete(delete_transaction))
}
