pub mod products;
pub mod transactions;
pub mod categories;
pub mod uploads;

use axum::Router;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(transactions::routes())
        .merge(categories::routes())
        .merge(uploads::routes())
}
