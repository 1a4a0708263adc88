pub mod catalog;
pub mod customers;
pub mod export;
pub mod orders;
pub mod reports;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::AppState;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthView {
    pub status: String,
    pub version: String,
    pub backoffice: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Console and backoffice are reachable", body = HealthView),
        (status = 503, description = "Backoffice is unreachable", body = HealthView)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let backoffice = match state.backoffice.ping().await {
        Ok(()) => "reachable",
        Err(err) => {
            tracing::warn!("backoffice ping failed: {}", err);
            "unreachable"
        }
    };

    let view = HealthView {
        status: if backoffice == "reachable" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        backoffice: backoffice.to_string(),
    };

    let status_code = if backoffice == "reachable" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(view))
}

/// Full route-revision map, for a fronting cache to diff and purge.
pub async fn revalidations(State(state): State<AppState>) -> Json<HashMap<String, u64>> {
    Json(state.revalidator.snapshot().await)
}

/// Wraps a page body and stamps the route's current revision so caches can
/// tell whether a mutation has invalidated what they hold.
pub(crate) async fn page_response<T: Serialize>(
    state: &AppState,
    route: &str,
    body: T,
) -> Result<Response, AppError> {
    let revision = state.revalidator.revision(route).await;
    let mut response = Json(body).into_response();
    let header = HeaderValue::from_str(&revision.to_string())
        .map_err(|_| AppError::Internal("revision header".to_string()))?;
    response.headers_mut().insert("x-console-revision", header);
    Ok(response)
}
