use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::client::ClientError;
use crate::dtos::category::{
    CategoryResponse, CreateCategoryRequest, SyncCategoriesResponse, UpdateCategoryRequest,
};
use crate::dtos::product::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::dtos::transaction::{
    CreateTransactionRequest, TransactionResponse, UpdateTransactionRequest,
};

/// Everything the state cache needs from the resource endpoints. The cache is
/// generic over this trait so its behavior is testable without a server.
#[async_trait]
pub trait PanelApi {
    async fn list_products(&self) -> Result<Vec<ProductResponse>, ClientError>;
    async fn create_product(
        &self,
        draft: &CreateProductRequest,
    ) -> Result<ProductResponse, ClientError>;
    async fn update_product(
        &self,
        id: &str,
        request: &UpdateProductRequest,
    ) -> Result<ProductResponse, ClientError>;
    async fn delete_product(&self, id: &str) -> Result<(), ClientError>;

    async fn list_transactions(&self) -> Result<Vec<TransactionResponse>, ClientError>;
    async fn create_transaction(
        &self,
        draft: &CreateTransactionRequest,
    ) -> Result<TransactionResponse, ClientError>;
    async fn update_transaction(
        &self,
        id: &str,
        request: &UpdateTransactionRequest,
    ) -> Result<TransactionResponse, ClientError>;
    async fn delete_transaction(&self, id: &str) -> Result<(), ClientError>;

    async fn list_categories(&self) -> Result<Vec<CategoryResponse>, ClientError>;
    async fn create_category(
        &self,
        draft: &CreateCategoryRequest,
    ) -> Result<CategoryResponse, ClientError>;
    async fn update_category(
        &self,
        request: &UpdateCategoryRequest,
    ) -> Result<CategoryResponse, ClientError>;
    async fn delete_category(&self, id: &str) -> Result<(), ClientError>;
    async fn sync_categories(&self) -> Result<SyncCategoriesResponse, ClientError>;
}

/// Shape of the server's structured error body.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// reqwest-backed implementation talking to the panel backend.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()))
        } else {
            // Prefer the server's own reason; fall back to the bare status
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("request failed with status {status}"));
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn put_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn delete_json(&self, path: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::decode::<serde_json::Value>(response).await.map(|_| ())
    }
}

#[async_trait]
impl PanelApi for HttpApi {
    async fn list_products(&self) -> Result<Vec<ProductResponse>, ClientError> {
        self.get_json("/api/products").await
    }

    async fn create_product(
        &self,
        draft: &CreateProductRequest,
    ) -> Result<ProductResponse, ClientError> {
        self.post_json("/api/products", draft).await
    }

    async fn update_product(
        &self,
        id: &str,
        request: &UpdateProductRequest,
    ) -> Result<ProductResponse, ClientError> {
        self.put_json(&format!("/api/products/{id}"), request).await
    }

    async fn delete_product(&self, id: &str) -> Result<(), ClientError> {
        self.delete_json(&format!("/api/products?id={id}")).await
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionResponse>, ClientError> {
        self.get_json("/api/transactions").await
    }

    async fn create_transaction(
        &self,
        draft: &CreateTransactionRequest,
    ) -> Result<TransactionResponse, ClientError> {
        self.post_json("/api/transactions", draft).await
    }

    async fn update_transaction(
        &self,
        id: &str,
        request: &UpdateTransactionRequest,
    ) -> Result<TransactionResponse, ClientError> {
        self.put_json(&format!("/api/transactions/{id}"), request)
            .await
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), ClientError> {
        self.delete_json(&format!("/api/transactions/{id}")).await
    }

    async fn list_categories(&self) -> Result<Vec<CategoryResponse>, ClientError> {
        self.get_json("/api/categories").await
    }

    async fn create_category(
        &self,
        draft: &CreateCategoryRequest,
    ) -> Result<CategoryResponse, ClientError> {
        self.post_json("/api/categories", draft).await
    }

    async fn update_category(
        &self,
        request: &UpdateCategoryRequest,
    ) -> Result<CategoryResponse, ClientError> {
        // id travels in the body on this endpoint
        self.put_json("/api/categories", request).await
    }

    async fn delete_category(&self, id: &str) -> Result<(), ClientError> {
        self.delete_json(&format!("/api/categories?id={id}")).await
    }

    async fn sync_categories(&self) -> Result<SyncCategoriesResponse, ClientError> {
        self.post_json("/api/categories/sync", &serde_json::json!({}))
            .await
    }
}
