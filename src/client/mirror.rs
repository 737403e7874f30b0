use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::ClientError;

pub const PRODUCTS_SLOT: &str = "products";
pub const TRANSACTIONS_SLOT: &str = "transactions";
pub const CATEGORIES_SLOT: &str = "categories";

/// Last-known-good snapshots of the entity collections, one JSON file per
/// slot. Read on startup so the UI has data before the first refresh lands.
pub struct MirrorStore {
    dir: PathBuf,
}

impl MirrorStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }

    pub fn save<T: Serialize>(&self, slot: &str, items: &[T]) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir).map_err(|e| ClientError::Store(e.to_string()))?;
        let json = serde_json::to_vec(items).map_err(|e| ClientError::Store(e.to_string()))?;
        fs::write(self.slot_path(slot), json).map_err(|e| ClientError::Store(e.to_string()))
    }

    /// A missing or unreadable slot is not an error, just no snapshot. A
    /// corrupt snapshot is discarded the same way.
    pub fn load<T: DeserializeOwned>(&self, slot: &str) -> Option<Vec<T>> {
        let path = self.slot_path(slot);
        let raw = fs::read(&path).ok()?;
        match serde_json::from_slice(&raw) {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt mirror slot");
                None
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
