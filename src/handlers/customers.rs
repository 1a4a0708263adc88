use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::actions::{self, ActionResponse};
use crate::backoffice::CustomerFilter;
use crate::backoffice::models::{Customer, Referral};
use crate::domain::lifecycle::available_actions;
use crate::domain::overdue::order_overdue;
use crate::error::AppError;
use crate::revalidate::routes;
use crate::session::SessionContext;

use super::orders::OrderRow;
use super::page_response;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListQuery {
    pub search: Option<String>,
    pub branch_id: Option<Uuid>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn list_customers(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<CustomerListQuery>,
) -> Result<Response, AppError> {
    let filter = CustomerFilter {
        search: query.search,
        branch_id: session.effective_branch(query.branch_id),
        limit: query.limit,
        offset: query.offset,
    };

    let page = state
        .backoffice
        .list_customers(&session.token, &filter)
        .await
        .map_err(AppError::upstream)?;

    page_response(&state, routes::CUSTOMERS, page).await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetailView {
    pub customer: Customer,
    pub orders: Vec<OrderRow>,
    pub referrals: Vec<Referral>,
}

pub async fn customer_detail(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let customer = state
        .backoffice
        .get_customer(&session.token, id)
        .await
        .map_err(AppError::upstream)?;
    let orders = state
        .backoffice
        .customer_orders(&session.token, id)
        .await
        .map_err(AppError::upstream)?;
    let referrals = state
        .backoffice
        .customer_referrals(&session.token, id)
        .await
        .map_err(AppError::upstream)?;

    let now = Utc::now();
    let grace = state.config.collection_grace_days;
    let view = CustomerDetailView {
        customer,
        orders: orders
            .into_iter()
            .map(|order| OrderRow {
                overdue: order_overdue(&order, now, grace),
                available_actions: available_actions(&order),
                order,
            })
            .collect(),
        referrals,
    };

    page_response(&state, &routes::customer_detail(id), view).await
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReferralListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn list_referrals(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<ReferralListQuery>,
) -> Result<Response, AppError> {
    let page = state
        .backoffice
        .list_referrals(&session.token, query.limit, query.offset)
        .await
        .map_err(AppError::upstream)?;

    page_response(&state, routes::REFERRALS, page).await
}

pub async fn create_customer(
    State(state): State<AppState>,
    session: SessionContext,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::customers::create_customer(&state, &session, payload).await
}

pub async fn update_customer(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::customers::update_customer(&state, &session, id, payload).await
}

pub async fn create_referral(
    State(state): State<AppState>,
    session: SessionContext,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::customers::create_referral(&state, &session, payload).await
}
