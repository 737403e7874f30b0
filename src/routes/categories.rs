use axum::{
    routing::{get, post},
    Router,
};
use crate::handlers::category::{
    get_categories, create_category, update_category, delete_category, sync_categories
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(get_categories)
                .post(create_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/categories/sync", post(sync_categories))
}
