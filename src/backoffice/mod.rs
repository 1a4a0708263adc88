pub mod catalog;
pub mod customers;
pub mod models;
pub mod orders;
pub mod reports;

pub use catalog::{BatchRequest, BranchRequest, ProductFilter, ProductRequest, StockAdjustmentRequest};
pub use customers::{CustomerFilter, CustomerRequest, ReferralRequest};
pub use orders::{CreateOrderRequest, OrderFilter, OrderItemRequest, PaymentRequest, ReversalRequest};
pub use reports::ReportFilter;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::ser::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackofficeError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backoffice returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid response from backoffice: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl BackofficeError {
    /// Builds the error for a non-2xx backoffice response. The backoffice
    /// reports failures as `{"message": …}` (sometimes `{"error": …}`); that
    /// text is carried verbatim so the console can surface it unchanged.
    fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message.or(parsed.error))
            .unwrap_or_else(|| "The backoffice request failed".to_string());

        BackofficeError::Api { status, message }
    }

    /// The line shown to the user: the backoffice's own words when it gave
    /// any, a generic one otherwise.
    pub fn display_message(&self) -> String {
        match self {
            BackofficeError::Api { message, .. } => message.clone(),
            BackofficeError::Transport(_) | BackofficeError::Decode(_) => {
                "The backoffice request failed".to_string()
            }
        }
    }
}

/// HTTP client for the backoffice Order/Payment API. One instance is shared
/// across the app; the session bearer is passed per call because every token
/// belongs to a user, not to the process. No timeout, no retry, no breaker:
/// a failed call is reported as failed and the caller decides nothing else.
#[derive(Clone)]
pub struct BackofficeClient {
    client: Client,
    base_url: String,
}

impl BackofficeClient {
    pub fn new(base_url: String) -> Self {
        BackofficeClient {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackofficeError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        Self::read_json(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        body: &B,
    ) -> Result<T, BackofficeError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        Self::read_json(response).await
    }

    pub(crate) async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        body: &B,
    ) -> Result<T, BackofficeError> {
        let response = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        Self::read_json(response).await
    }

    pub(crate) async fn delete(&self, token: &str, path: &str) -> Result<(), BackofficeError> {
        let response = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;

        Self::read_empty(response).await
    }

    /// Liveness probe against the backoffice, used by the console's own
    /// health endpoint. Sends no bearer token.
    pub async fn ping(&self) -> Result<(), BackofficeError> {
        let response = self.client.get(self.url("/health")).send().await?;
        Self::read_empty(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackofficeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackofficeError::from_response(status.as_u16(), &body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| BackofficeError::Decode(err.to_string()))
    }

    async fn read_empty(response: Response) -> Result<(), BackofficeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackofficeError::from_response(status.as_u16(), &body));
        }

        Ok(())
    }
}
