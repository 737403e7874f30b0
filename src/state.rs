// src/state.rs
use sqlx::PgPool;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(db_pool: PgPool, upload_dir: PathBuf) -> Self {
        Self { db_pool, upload_dir }
    }
}
