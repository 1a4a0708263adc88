use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{Customer, Order, Page, Referral};
use super::{BackofficeClient, BackofficeError};

#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub branch_id: Option<Uuid>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl CustomerFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(branch_id) = &self.branch_id {
            pairs.push(("branchId", branch_id.to_string()));
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
pub struct CustomerRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    pub branch_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRequest {
    pub referrer_id: Uuid,
    pub referred_name: String,
    pub referred_phone: String,
}

impl BackofficeClient {
    pub async fn list_customers(
        &self,
        token: &str,
        filter: &CustomerFilter,
    ) -> Result<Page<Customer>, BackofficeError> {
        self.get_json(token, "/api/customers", &filter.query_pairs()).await
    }

    pub async fn get_customer(&self, token: &str, id: Uuid) -> Result<Customer, BackofficeError> {
        self.get_json(token, &format!("/api/customers/{id}"), &[]).await
    }

    pub async fn customer_orders(
        &self,
        token: &str,
        id: Uuid,
    ) -> Result<Vec<Order>, BackofficeError> {
        self.get_json(token, &format!("/api/customers/{id}/orders"), &[]).await
    }

    pub async fn customer_referrals(
        &self,
        token: &str,
        id: Uuid,
    ) -> Result<Vec<Referral>, BackofficeError> {
        self.get_json(token, &format!("/api/customers/{id}/referrals"), &[])
            .await
    }

    pub async fn create_customer(
        &self,
        token: &str,
        request: &CustomerRequest,
    ) -> Result<Customer, BackofficeError> {
        self.post_json(token, "/api/customers", request).await
    }

    pub async fn update_customer(
        &self,
        token: &str,
        id: Uuid,
        request: &CustomerRequest,
    ) -> Result<Customer, BackofficeError> {
        self.put_json(token, &format!("/api/customers/{id}"), request).await
    }

    pub async fn list_referrals(
        &self,
        token: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Page<Referral>, BackofficeError> {
        let mut pairs = Vec::new();
        if let Some(limit) = limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            pairs.push(("offset", offset.to_string()));
        }
        self.get_json(token, "/api/referrals", &pairs).await
    }

    pub async fn create_referral(
        &self,
        token: &str,
        request: &ReferralRequest,
    ) -> Result<Referral, BackofficeError> {
        self.post_json(token, "/api/referrals", request).await
    }
}
