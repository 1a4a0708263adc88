use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{Batch, Branch, Page, Product, StockLevel};
use super::{BackofficeClient, BackofficeError};

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub include_inactive: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ProductFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if self.include_inactive {
            pairs.push(("includeInactive", "true".to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRequest {
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub product_id: Uuid,
    pub branch_id: Uuid,
    pub quantity: i64,
    pub unit_cost: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentRequest {
    pub product_id: Uuid,
    pub branch_id: Uuid,
    pub quantity_delta: i64,
    pub reason: String,
}

impl BackofficeClient {
    pub async fn list_branches(&self, token: &str) -> Result<Page<Branch>, BackofficeError> {
        self.get_json(token, "/api/branches", &[]).await
    }

    pub async fn create_branch(
        &self,
        token: &str,
        request: &BranchRequest,
    ) -> Result<Branch, BackofficeError> {
        self.post_json(token, "/api/branches", request).await
    }

    pub async fn update_branch(
        &self,
        token: &str,
        id: Uuid,
        request: &BranchRequest,
    ) -> Result<Branch, BackofficeError> {
        self.put_json(token, &format!("/api/branches/{id}"), request).await
    }

    pub async fn delete_branch(&self, token: &str, id: Uuid) -> Result<(), BackofficeError> {
        self.delete(token, &format!("/api/branches/{id}")).await
    }

    pub async fn list_products(
        &self,
        token: &str,
        filter: &ProductFilter,
    ) -> Result<Page<Product>, BackofficeError> {
        self.get_json(token, "/api/products", &filter.query_pairs()).await
    }

    pub async fn create_product(
        &self,
        token: &str,
        request: &ProductRequest,
    ) -> Result<Product, BackofficeError> {
        self.post_json(token, "/api/products", request).await
    }

    pub async fn update_product(
        &self,
        token: &str,
        id: Uuid,
        request: &ProductRequest,
    ) -> Result<Product, BackofficeError> {
        self.put_json(token, &format!("/api/products/{id}"), request).await
    }

    pub async fn delete_product(&self, token: &str, id: Uuid) -> Result<(), BackofficeError> {
        self.delete(token, &format!("/api/products/{id}")).await
    }

    pub async fn list_batches(
        &self,
        token: &str,
        branch_id: Option<Uuid>,
    ) -> Result<Page<Batch>, BackofficeError> {
        let mut pairs = Vec::new();
        if let Some(branch_id) = branch_id {
            pairs.push(("branchId", branch_id.to_string()));
        }
        self.get_json(token, "/api/batches", &pairs).await
    }

    pub async fn create_batch(
        &self,
        token: &str,
        request: &BatchRequest,
    ) -> Result<Batch, BackofficeError> {
        self.post_json(token, "/api/batches", request).await
    }

    pub async fn update_batch(
        &self,
        token: &str,
        id: Uuid,
        request: &BatchRequest,
    ) -> Result<Batch, BackofficeError> {
        self.put_json(token, &format!("/api/batches/{id}"), request).await
    }

    pub async fn delete_batch(&self, token: &str, id: Uuid) -> Result<(), BackofficeError> {
        self.delete(token, &format!("/api/batches/{id}")).await
    }

    pub async fn stock_levels(
        &self,
        token: &str,
        branch_id: Option<Uuid>,
    ) -> Result<Page<StockLevel>, BackofficeError> {
        let mut pairs = Vec::new();
        if let Some(branch_id) = branch_id {
            pairs.push(("branchId", branch_id.to_string()));
        }
        self.get_json(token, "/api/stock-levels", &pairs).await
    }

    pub async fn adjust_stock(
        &self,
        token: &str,
        request: &StockAdjustmentRequest,
    ) -> Result<StockLevel, BackofficeError> {
        self.post_json(token, "/api/stock-adjustments", request).await
    }
}
