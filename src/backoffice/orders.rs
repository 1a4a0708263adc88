use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{LayawayInstallment, LayawaySummary, Order, Page, Payment};
use super::{BackofficeClient, BackofficeError};

/// Query filters for the order list. Unset fields are simply not sent.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub order_type: Option<String>,
    pub branch_id: Option<Uuid>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl OrderFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(order_type) = &self.order_type {
            pairs.push(("orderType", order_type.clone()));
        }
        if let Some(branch_id) = &self.branch_id {
            pairs.push(("branchId", branch_id.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
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
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub branch_id: Uuid,
    pub order_type: String,
    pub items: Vec<OrderItemRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: BigDecimal,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalRequest {
    pub reason: String,
}

impl BackofficeClient {
    pub async fn list_orders(
        &self,
        token: &str,
        filter: &OrderFilter,
    ) -> Result<Page<Order>, BackofficeError> {
        self.get_json(token, "/api/orders", &filter.query_pairs()).await
    }

    pub async fn get_order(&self, token: &str, id: Uuid) -> Result<Order, BackofficeError> {
        self.get_json(token, &format!("/api/orders/{id}"), &[]).await
    }

    pub async fn order_payments(
        &self,
        token: &str,
        id: Uuid,
    ) -> Result<Vec<Payment>, BackofficeError> {
        self.get_json(token, &format!("/api/orders/{id}/payments"), &[]).await
    }

    pub async fn layaway_summary(
        &self,
        token: &str,
        id: Uuid,
    ) -> Result<LayawaySummary, BackofficeError> {
        self.get_json(token, &format!("/api/orders/{id}/layaway"), &[]).await
    }

    pub async fn layaway_schedule(
        &self,
        token: &str,
        id: Uuid,
    ) -> Result<Vec<LayawayInstallment>, BackofficeError> {
        self.get_json(token, &format!("/api/orders/{id}/layaway/schedule"), &[])
            .await
    }

    pub async fn create_order(
        &self,
        token: &str,
        request: &CreateOrderRequest,
    ) -> Result<Order, BackofficeError> {
        self.post_json(token, "/api/orders", request).await
    }

    pub async fn convert_quotation(&self, token: &str, id: Uuid) -> Result<Order, BackofficeError> {
        self.post_json(token, &format!("/api/orders/{id}/convert"), &serde_json::json!({}))
            .await
    }

    pub async fn process_payment(
        &self,
        token: &str,
        id: Uuid,
        request: &PaymentRequest,
    ) -> Result<Payment, BackofficeError> {
        self.post_json(token, &format!("/api/orders/{id}/payments"), request).await
    }

    pub async fn mark_ready(&self, token: &str, id: Uuid) -> Result<Order, BackofficeError> {
        self.post_json(token, &format!("/api/orders/{id}/ready"), &serde_json::json!({}))
            .await
    }

    pub async fn complete_collection(
        &self,
        token: &str,
        id: Uuid,
    ) -> Result<Order, BackofficeError> {
        self.post_json(token, &format!("/api/orders/{id}/collect"), &serde_json::json!({}))
            .await
    }

    pub async fn reverse_order(
        &self,
        token: &str,
        id: Uuid,
        request: &ReversalRequest,
    ) -> Result<Order, BackofficeError> {
        self.post_json(token, &format!("/api/orders/{id}/reverse"), request).await
    }

    pub async fn reverse_payment(
        &self,
        token: &str,
        payment_id: Uuid,
        request: &ReversalRequest,
    ) -> Result<Payment, BackofficeError> {
        self.post_json(token, &format!("/api/payments/{payment_id}/reverse"), request)
            .await
    }
}
