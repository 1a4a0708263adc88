use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::actions::{self, ActionResponse};
use crate::backoffice::ProductFilter;
use crate::error::AppError;
use crate::revalidate::routes;
use crate::session::SessionContext;

use super::page_response;

pub async fn list_branches(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Response, AppError> {
    let page = state
        .backoffice
        .list_branches(&session.token)
        .await
        .map_err(AppError::upstream)?;

    page_response(&state, routes::BRANCHES, page).await
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub include_inactive: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn list_products(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<ProductListQuery>,
) -> Result<Response, AppError> {
    let filter = ProductFilter {
        category: query.category,
        search: query.search,
        include_inactive: query.include_inactive.unwrap_or(false),
        limit: query.limit,
        offset: query.offset,
    };

    let page = state
        .backoffice
        .list_products(&session.token, &filter)
        .await
        .map_err(AppError::upstream)?;

    page_response(&state, routes::PRODUCTS, page).await
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BranchScopedQuery {
    pub branch_id: Option<Uuid>,
}

pub async fn list_batches(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<BranchScopedQuery>,
) -> Result<Response, AppError> {
    let branch_id = session.effective_branch(query.branch_id);
    let page = state
        .backoffice
        .list_batches(&session.token, branch_id)
        .await
        .map_err(AppError::upstream)?;

    page_response(&state, routes::BATCHES, page).await
}

pub async fn inventory(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<BranchScopedQuery>,
) -> Result<Response, AppError> {
    let branch_id = session.effective_branch(query.branch_id);
    let page = state
        .backoffice
        .stock_levels(&session.token, branch_id)
        .await
        .map_err(AppError::upstream)?;

    page_response(&state, routes::INVENTORY, page).await
}

pub async fn create_branch(
    State(state): State<AppState>,
    session: SessionContext,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::catalog::create_branch(&state, &session, payload).await
}

pub async fn update_branch(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::catalog::update_branch(&state, &session, id, payload).await
}

pub async fn delete_branch(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> ActionResponse {
    actions::catalog::delete_branch(&state, &session, id).await
}

pub async fn create_product(
    State(state): State<AppState>,
    session: SessionContext,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::catalog::create_product(&state, &session, payload).await
}

pub async fn update_product(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::catalog::update_product(&state, &session, id, payload).await
}

pub async fn delete_product(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> ActionResponse {
    actions::catalog::delete_product(&state, &session, id).await
}

pub async fn create_batch(
    State(state): State<AppState>,
    session: SessionContext,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::catalog::create_batch(&state, &session, payload).await
}

pub async fn update_batch(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::catalog::update_batch(&state, &session, id, payload).await
}

pub async fn delete_batch(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> ActionResponse {
    actions::catalog::delete_batch(&state, &session, id).await
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    session: SessionContext,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::catalog::adjust_stock(&state, &session, payload).await
}
