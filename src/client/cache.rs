use tracing::warn;

use crate::client::api::PanelApi;
use crate::client::mirror::{
    MirrorStore, CATEGORIES_SLOT, PRODUCTS_SLOT, TRANSACTIONS_SLOT,
};
use crate::client::ClientError;
use crate::dtos::category::{CategoryResponse, CreateCategoryRequest, SyncCategoriesResponse};
use crate::dtos::product::{CreateProductRequest, ProductResponse};
use crate::dtos::transaction::{CreateTransactionRequest, TransactionResponse};
use crate::models::transaction::TransactionKind;

/// Partial product update applied optimistically to the in-memory record.
/// Absent fields stay unchanged.
#[derive(Debug, Default, Clone)]
pub struct ProductPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub model: Option<String>,
    pub description: Option<String>,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub suggested_sale_price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub in_stock: Option<bool>,
    pub barcode: Option<String>,
}

impl ProductPatch {
    fn apply(self, target: &mut ProductResponse) {
        if let Some(v) = self.code {
            target.code = v;
        }
        if let Some(v) = self.name {
            target.name = v;
        }
        if let Some(v) = self.brand {
            target.brand = v;
        }
        if let Some(v) = self.color {
            target.color = v;
        }
        if let Some(v) = self.category {
            target.category = v;
        }
        if let Some(v) = self.model {
            target.model = Some(v);
        }
        if let Some(v) = self.description {
            target.description = Some(v);
        }
        if let Some(v) = self.purchase_price {
            target.purchase_price = v;
        }
        if let Some(v) = self.sale_price {
            target.sale_price = v;
        }
        if let Some(v) = self.suggested_sale_price {
            target.suggested_sale_price = Some(v);
        }
        if let Some(v) = self.images {
            target.images = v;
        }
        if let Some(v) = self.in_stock {
            target.in_stock = v;
        }
        if let Some(v) = self.barcode {
            target.barcode = Some(v);
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<chrono::DateTime<chrono::Utc>>,
}

impl TransactionPatch {
    fn apply(self, target: &mut TransactionResponse) {
        if let Some(v) = self.kind {
            target.kind = v;
        }
        if let Some(v) = self.amount {
            target.amount = v;
        }
        if let Some(v) = self.description {
            target.description = v;
        }
        if let Some(v) = self.category {
            target.category = Some(v);
        }
        if let Some(v) = self.date {
            target.date = v;
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryPatch {
    fn apply(self, target: &mut CategoryResponse) {
        if let Some(v) = self.name {
            target.name = v;
        }
        if let Some(v) = self.description {
            target.description = Some(v);
        }
    }
}

/// In-process authority for what the UI currently believes. Collections are
/// newest-first. Writes are write-through (server confirms before local state
/// changes) except the `update_*` patch path, which is deliberately local-only
/// and relies on a separately confirmed server write. Failures never clear or
/// corrupt prior state.
pub struct AppCache<A: PanelApi> {
    api: A,
    mirror: MirrorStore,
    pub products: Vec<ProductResponse>,
    pub transactions: Vec<TransactionResponse>,
    pub categories: Vec<CategoryResponse>,
    pub is_loading: bool,
}

impl<A: PanelApi> AppCache<A> {
    pub fn new(api: A, mirror: MirrorStore) -> Self {
        Self {
            api,
            mirror,
            products: Vec::new(),
            transactions: Vec::new(),
            categories: Vec::new(),
            is_loading: false,
        }
    }

    /// Seed collections from the last-known-good snapshots so the UI is not
    /// blank while the first refresh is in flight. Missing slots stay empty.
    pub fn load_mirror(&mut self) {
        if let Some(products) = self.mirror.load(PRODUCTS_SLOT) {
            self.products = products;
        }
        if let Some(transactions) = self.mirror.load(TRANSACTIONS_SLOT) {
            self.transactions = transactions;
        }
        if let Some(categories) = self.mirror.load(CATEGORIES_SLOT) {
            self.categories = categories;
        }
    }

    fn mirror_slot<T: serde::Serialize>(mirror: &MirrorStore, slot: &str, items: &[T]) {
        // Mirror failures must not fail the refresh that produced the data
        if let Err(e) = mirror.save(slot, items) {
            warn!(slot, error = %e, "Failed to mirror collection");
        }
    }

    /// Full wholesale replace from the server. The only operation that toggles
    /// the shared loading flag.
    pub async fn refresh_products(&mut self) -> Result<(), ClientError> {
        self.is_loading = true;
        let result = self.api.list_products().await;
        self.is_loading = false;

        match result {
            Ok(products) => {
                self.products = products;
                Self::mirror_slot(&self.mirror, PRODUCTS_SLOT, &self.products);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Product refresh failed, keeping cached data");
                Err(e)
            }
        }
    }

    pub async fn refresh_transactions(&mut self) -> Result<(), ClientError> {
        match self.api.list_transactions().await {
            Ok(transactions) => {
                self.transactions = transactions;
                Self::mirror_slot(&self.mirror, TRANSACTIONS_SLOT, &self.transactions);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Transaction refresh failed, keeping cached data");
                Err(e)
            }
        }
    }

    pub async fn refresh_categories(&mut self) -> Result<(), ClientError> {
        match self.api.list_categories().await {
            Ok(categories) => {
                self.categories = categories;
                Self::mirror_slot(&self.mirror, CATEGORIES_SLOT, &self.categories);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Category refresh failed, keeping cached data");
                Err(e)
            }
        }
    }

    /// Write-through: no local change until the server confirms, then the
    /// canonical record is prepended (newest-first display order).
    pub async fn add_product(
        &mut self,
        draft: CreateProductRequest,
    ) -> Result<ProductResponse, ClientError> {
        let created = self.api.create_product(&draft).await?;
        self.products.insert(0, created.clone());
        Ok(created)
    }

    pub async fn add_transaction(
        &mut self,
        draft: CreateTransactionRequest,
    ) -> Result<TransactionResponse, ClientError> {
        let created = self.api.create_transaction(&draft).await?;
        self.transactions.insert(0, created.clone());
        Ok(created)
    }

    pub async fn add_category(
        &mut self,
        draft: CreateCategoryRequest,
    ) -> Result<CategoryResponse, ClientError> {
        let created = self.api.create_category(&draft).await?;
        self.categories.insert(0, created.clone());
        Ok(created)
    }

    /// Optimistic local patch; callers needing server confirmation issue their
    /// own endpoint request first and reconcile through this.
    pub fn update_product(&mut self, id: &str, patch: ProductPatch) {
        if let Some(product) = self.products.iter_mut().find(|p| p.id == id) {
            patch.apply(product);
        }
    }

    pub fn update_transaction(&mut self, id: &str, patch: TransactionPatch) {
        if let Some(transaction) = self.transactions.iter_mut().find(|t| t.id == id) {
            patch.apply(transaction);
        }
    }

    pub fn update_category(&mut self, id: &str, patch: CategoryPatch) {
        if let Some(category) = self.categories.iter_mut().find(|c| c.id == id) {
            patch.apply(category);
        }
    }

    /// Server-first delete; the record leaves the cache only on confirmation.
    /// A successful product deletion also refreshes transactions so derived
    /// views stay consistent.
    pub async fn delete_product(&mut self, id: &str) -> Result<(), ClientError> {
        self.api.delete_product(id).await.map_err(|e| {
            warn!(id, error = %e, "Product deletion rejected");
            e
        })?;

        self.products.retain(|p| p.id != id);
        Self::mirror_slot(&self.mirror, PRODUCTS_SLOT, &self.products);
        // Refresh failure here is non-fatal; it already logged itself
        let _ = self.refresh_transactions().await;
        Ok(())
    }

    pub async fn delete_transaction(&mut self, id: &str) -> Result<(), ClientError> {
        self.api.delete_transaction(id).await.map_err(|e| {
            warn!(id, error = %e, "Transaction deletion rejected");
            e
        })?;

        self.transactions.retain(|t| t.id != id);
        Self::mirror_slot(&self.mirror, TRANSACTIONS_SLOT, &self.transactions);
        Ok(())
    }

    pub async fn delete_category(&mut self, id: &str) -> Result<(), ClientError> {
        self.api.delete_category(id).await.map_err(|e| {
            warn!(id, error = %e, "Category deletion rejected");
            e
        })?;

        self.categories.retain(|c| c.id != id);
        Self::mirror_slot(&self.mirror, CATEGORIES_SLOT, &self.categories);
        Ok(())
    }

    /// Run the server-side category reconciler, then pull the updated list.
    pub async fn sync_categories(&mut self) -> Result<SyncCategoriesResponse, ClientError> {
        let summary = self.api.sync_categories().await?;
        self.refresh_categories().await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::dtos::product::UpdateProductRequest;
    use crate::dtos::transaction::UpdateTransactionRequest;

    fn product(id: &str, name: &str) -> ProductResponse {
        ProductResponse {
            id: id.to_string(),
            code: "001".to_string(),
            name: name.to_string(),
            brand: "Marka".to_string(),
            color: "Siyah".to_string(),
            category: "el-cantasi".to_string(),
            model: None,
            description: None,
            purchase_price: 100.0,
            sale_price: 250.0,
            suggested_sale_price: None,
            images: Vec::new(),
            in_stock: true,
            barcode: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn transaction(id: &str, amount: f64) -> TransactionResponse {
        TransactionResponse {
            id: id.to_string(),
            kind: TransactionKind::Income,
            amount,
            description: "satış".to_string(),
            category: None,
            product_id: None,
            date: Utc::now(),
            created_at: Utc::now(),
        }
    }

    fn category(id: &str, name: &str) -> CategoryResponse {
        CategoryResponse {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            product_count: 0,
        }
    }

    #[derive(Default)]
    struct StubApi {
        products: Vec<ProductResponse>,
        transactions: Vec<TransactionResponse>,
        categories: Vec<CategoryResponse>,
        fail: bool,
        guard_message: Option<String>,
        transaction_lists: AtomicUsize,
        server_updates: AtomicUsize,
    }

    impl StubApi {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn check(&self) -> Result<(), ClientError> {
            if self.fail {
                if let Some(message) = &self.guard_message {
                    return Err(ClientError::Api {
                        status: 400,
                        message: message.clone(),
                    });
                }
                return Err(ClientError::Network("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PanelApi for StubApi {
        async fn list_products(&self) -> Result<Vec<ProductResponse>, ClientError> {
            self.check()?;
            Ok(self.products.clone())
        }

        async fn create_product(
            &self,
            draft: &CreateProductRequest,
        ) -> Result<ProductResponse, ClientError> {
            self.check()?;
            let mut created = product("server-id", &draft.name);
            created.code = "002".to_string();
            Ok(created)
        }

        async fn update_product(
            &self,
            _id: &str,
            request: &UpdateProductRequest,
        ) -> Result<ProductResponse, ClientError> {
            self.server_updates.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(product("server-id", &request.name))
        }

        async fn delete_product(&self, _id: &str) -> Result<(), ClientError> {
            self.check()
        }

        async fn list_transactions(&self) -> Result<Vec<TransactionResponse>, ClientError> {
            self.transaction_lists.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.transactions.clone())
        }

        async fn create_transaction(
            &self,
            draft: &CreateTransactionRequest,
        ) -> Result<TransactionResponse, ClientError> {
            self.check()?;
            Ok(transaction("server-id", draft.amount))
        }

        async fn update_transaction(
            &self,
            _id: &str,
            request: &UpdateTransactionRequest,
        ) -> Result<TransactionResponse, ClientError> {
            self.server_updates.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(transaction("server-id", request.amount))
        }

        async fn delete_transaction(&self, _id: &str) -> Result<(), ClientError> {
            self.check()
        }

        async fn list_categories(&self) -> Result<Vec<CategoryResponse>, ClientError> {
            self.check()?;
            Ok(self.categories.clone())
        }

        async fn create_category(
            &self,
            draft: &CreateCategoryRequest,
        ) -> Result<CategoryResponse, ClientError> {
            self.check()?;
            Ok(category("server-id", &draft.name))
        }

        async fn update_category(
            &self,
            request: &crate::dtos::category::UpdateCategoryRequest,
        ) -> Result<CategoryResponse, ClientError> {
            self.server_updates.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(category(&request.id, &request.name))
        }

        async fn delete_category(&self, _id: &str) -> Result<(), ClientError> {
            self.check()
        }

        async fn sync_categories(&self) -> Result<SyncCategoriesResponse, ClientError> {
            self.check()?;
            Ok(SyncCategoriesResponse {
                message: "0 kategori eklendi".to_string(),
                added_categories: Vec::new(),
                all_categories: Vec::new(),
            })
        }
    }

    // The TempDir guard must outlive the cache or the mirror directory
    // disappears mid-test.
    fn cache_with(api: StubApi) -> (AppCache<StubApi>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let cache = AppCache::new(api, MirrorStore::new(dir.path()));
        (cache, dir)
    }

    #[tokio::test]
    async fn refresh_replaces_collection_wholesale() {
        let api = StubApi {
            products: vec![product("p1", "Çanta A"), product("p2", "Çanta B")],
            ..Default::default()
        };
        let (mut cache, _dir) = cache_with(api);
        cache.products = vec![product("stale", "Eski")];

        cache.refresh_products().await.unwrap();

        assert_eq!(cache.products.len(), 2);
        assert_eq!(cache.products[0].id, "p1");
        assert!(!cache.is_loading);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_existing_data() {
        let (mut cache, _dir) = cache_with(StubApi::failing());
        cache.products = vec![product("p1", "Çanta A")];

        let result = cache.refresh_products().await;

        assert!(result.is_err());
        assert_eq!(cache.products.len(), 1);
        assert_eq!(cache.products[0].id, "p1");
        assert!(!cache.is_loading);
    }

    #[tokio::test]
    async fn successful_refresh_mirrors_snapshot() {
        let api = StubApi {
            products: vec![product("p1", "Çanta A")],
            ..Default::default()
        };
        let (mut cache, _dir) = cache_with(api);

        cache.refresh_products().await.unwrap();

        let restored: Vec<ProductResponse> = cache.mirror.load(PRODUCTS_SLOT).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].id, "p1");
    }

    #[tokio::test]
    async fn mirror_seeds_collections_on_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = MirrorStore::new(dir.path());
        mirror
            .save(PRODUCTS_SLOT, &[product("p1", "Çanta A")])
            .unwrap();
        mirror.save(TRANSACTIONS_SLOT, &[transaction("t1", 650.0)]).unwrap();

        let mut cache = AppCache::new(StubApi::failing(), MirrorStore::new(dir.path()));
        cache.load_mirror();

        assert_eq!(cache.products.len(), 1);
        assert_eq!(cache.transactions.len(), 1);
        assert!(cache.categories.is_empty());
    }

    #[tokio::test]
    async fn add_is_write_through_on_failure() {
        let (mut cache, _dir) = cache_with(StubApi::failing());
        cache.products = vec![product("p1", "Çanta A")];

        let draft = CreateProductRequest {
            name: "Yeni".to_string(),
            brand: "Marka".to_string(),
            color: "Kahve".to_string(),
            category: "el-cantasi".to_string(),
            model: None,
            description: None,
            purchase_price: 10.0,
            sale_price: 20.0,
            suggested_sale_price: None,
            images: Vec::new(),
        };

        assert!(cache.add_product(draft).await.is_err());
        assert_eq!(cache.products.len(), 1);
    }

    #[tokio::test]
    async fn add_prepends_confirmed_record() {
        let (mut cache, _dir) = cache_with(StubApi::default());
        cache.products = vec![product("p1", "Çanta A")];

        let draft = CreateProductRequest {
            name: "Yeni".to_string(),
            brand: "Marka".to_string(),
            color: "Kahve".to_string(),
            category: "el-cantasi".to_string(),
            model: None,
            description: None,
            purchase_price: 10.0,
            sale_price: 20.0,
            suggested_sale_price: None,
            images: Vec::new(),
        };

        let created = cache.add_product(draft).await.unwrap();

        assert_eq!(created.id, "server-id");
        assert_eq!(cache.products.len(), 2);
        assert_eq!(cache.products[0].id, "server-id");
    }

    #[tokio::test]
    async fn update_is_local_only() {
        let (mut cache, _dir) = cache_with(StubApi::default());
        cache.products = vec![product("p1", "Çanta A")];

        cache.update_product(
            "p1",
            ProductPatch {
                name: Some("Yeni İsim".to_string()),
                in_stock: Some(false),
                ..Default::default()
            },
        );

        assert_eq!(cache.products[0].name, "Yeni İsim");
        assert!(!cache.products[0].in_stock);
        assert_eq!(cache.api.server_updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_unknown_id_is_a_no_op() {
        let (mut cache, _dir) = cache_with(StubApi::default());
        cache.products = vec![product("p1", "Çanta A")];

        cache.update_product(
            "missing",
            ProductPatch {
                name: Some("X".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(cache.products[0].name, "Çanta A");
    }

    #[tokio::test]
    async fn delete_product_refreshes_transactions() {
        let api = StubApi {
            transactions: vec![transaction("t1", 100.0)],
            ..Default::default()
        };
        let (mut cache, _dir) = cache_with(api);
        cache.products = vec![product("p1", "Çanta A")];

        cache.delete_product("p1").await.unwrap();

        assert!(cache.products.is_empty());
        assert_eq!(cache.api.transaction_lists.load(Ordering::SeqCst), 1);
        assert_eq!(cache.transactions.len(), 1);
    }

    #[tokio::test]
    async fn rejected_delete_keeps_record_and_surfaces_reason() {
        let api = StubApi {
            fail: true,
            guard_message: Some(
                "Bu ürünün satış geçmişi bulunduğu için silinemez.".to_string(),
            ),
            ..Default::default()
        };
        let (mut cache, _dir) = cache_with(api);
        cache.products = vec![product("p1", "Çanta A")];

        let err = cache.delete_product("p1").await.unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("silinemez"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(cache.products.len(), 1);
        assert_eq!(cache.api.transaction_lists.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_category_is_server_first() {
        let (mut cache, _dir) = cache_with(StubApi::default());
        cache.categories = vec![category("c1", "el-cantasi")];

        cache.delete_category("c1").await.unwrap();

        assert!(cache.categories.is_empty());
    }
}
