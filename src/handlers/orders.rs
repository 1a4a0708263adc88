use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::actions::{self, ActionResponse};
use crate::backoffice::OrderFilter;
use crate::backoffice::models::{
    LayawayInstallment, LayawaySummary, Order, OrderType, Payment,
};
use crate::domain::lifecycle::{OrderAction, available_actions};
use crate::domain::overdue::{installment_overdue, order_overdue, order_overdue_detailed};
use crate::error::AppError;
use crate::revalidate::routes;
use crate::session::SessionContext;
use crate::validation::ALLOWED_PAYMENT_METHODS;

use super::page_response;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub order_type: Option<String>,
    pub branch_id: Option<Uuid>,
    pub overdue: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    #[serde(flatten)]
    pub order: Order,
    pub overdue: bool,
    pub available_actions: Vec<OrderAction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListView {
    pub items: Vec<OrderRow>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

pub async fn list_orders(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<OrderListQuery>,
) -> Result<Response, AppError> {
    let filter = OrderFilter {
        status: query.status,
        order_type: query.order_type,
        branch_id: session.effective_branch(query.branch_id),
        search: query.search,
        limit: query.limit,
        offset: query.offset,
    };

    let page = state
        .backoffice
        .list_orders(&session.token, &filter)
        .await
        .map_err(AppError::upstream)?;

    let now = Utc::now();
    let grace = state.config.collection_grace_days;
    let mut items: Vec<OrderRow> = page
        .items
        .into_iter()
        .map(|order| OrderRow {
            overdue: order_overdue(&order, now, grace),
            available_actions: available_actions(&order),
            order,
        })
        .collect();

    if query.overdue == Some(true) {
        items.retain(|row| row.overdue);
    }

    let view = OrderListView {
        items,
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    };

    page_response(&state, routes::ORDERS, view).await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentRow {
    #[serde(flatten)]
    pub installment: LayawayInstallment,
    pub overdue: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayawayView {
    pub summary: LayawaySummary,
    pub schedule: Vec<InstallmentRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailView {
    pub order: Order,
    pub payments: Vec<Payment>,
    pub layaway: Option<LayawayView>,
    pub overdue: bool,
    pub available_actions: Vec<OrderAction>,
}

/// The backoffice owns the order arithmetic; the console re-checks the
/// advertised amounts against the payment list before rendering and logs
/// drift without ever adjusting the displayed numbers.
fn check_amount_consistency(order: &Order, payments: &[Payment]) {
    let paid_from_payments = payments
        .iter()
        .filter(|payment| !payment.reversed)
        .fold(BigDecimal::from(0), |acc, payment| acc + &payment.amount);
    if paid_from_payments != order.paid_amount {
        tracing::warn!(
            "order {} paidAmount {} disagrees with non-reversed payment sum {}",
            order.order_number,
            order.paid_amount,
            paid_from_payments
        );
    }

    let expected_balance = &order.total_amount - &order.paid_amount;
    if expected_balance != order.balance_amount {
        tracing::warn!(
            "order {} balanceAmount {} disagrees with totalAmount - paidAmount = {}",
            order.order_number,
            order.balance_amount,
            expected_balance
        );
    }
}

pub async fn order_detail(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let order = state
        .backoffice
        .get_order(&session.token, id)
        .await
        .map_err(AppError::upstream)?;
    let payments = state
        .backoffice
        .order_payments(&session.token, id)
        .await
        .map_err(AppError::upstream)?;

    check_amount_consistency(&order, &payments);

    let now = Utc::now();
    let (summary, schedule) = if order.order_type == OrderType::Layaway {
        let summary = state
            .backoffice
            .layaway_summary(&session.token, id)
            .await
            .map_err(AppError::upstream)?;
        let schedule = state
            .backoffice
            .layaway_schedule(&session.token, id)
            .await
            .map_err(AppError::upstream)?;
        (Some(summary), schedule)
    } else {
        (None, Vec::new())
    };

    let overdue = order_overdue_detailed(
        &order,
        &schedule,
        now,
        state.config.collection_grace_days,
    );

    let layaway = summary.map(|summary| LayawayView {
        summary,
        schedule: schedule
            .into_iter()
            .map(|installment| InstallmentRow {
                overdue: installment_overdue(&installment, now),
                installment,
            })
            .collect(),
    });

    let view = OrderDetailView {
        overdue,
        available_actions: available_actions(&order),
        order,
        payments,
        layaway,
    };

    page_response(&state, &routes::order_detail(id), view).await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPageView {
    pub order: Order,
    pub balance_amount: BigDecimal,
    pub accepted_methods: Vec<&'static str>,
    pub next_installment: Option<LayawayInstallment>,
}

/// View model for the payment form: the order snapshot, the balance the
/// form validates against and posts back, and the next unpaid installment
/// for layaway context.
pub async fn payment_page(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let order = state
        .backoffice
        .get_order(&session.token, id)
        .await
        .map_err(AppError::upstream)?;

    let next_installment = if order.order_type == OrderType::Layaway {
        state
            .backoffice
            .layaway_schedule(&session.token, id)
            .await
            .map_err(AppError::upstream)?
            .into_iter()
            .find(|installment| !installment.paid)
    } else {
        None
    };

    let view = PaymentPageView {
        balance_amount: order.balance_amount.clone(),
        accepted_methods: ALLOWED_PAYMENT_METHODS.to_vec(),
        next_installment,
        order,
    };

    page_response(&state, &routes::order_detail(id), view).await
}

pub async fn create_order(
    State(state): State<AppState>,
    session: SessionContext,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::orders::create_order(&state, &session, payload).await
}

pub async fn process_payment(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::orders::process_payment(&state, &session, id, payload).await
}

pub async fn convert_quotation(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> ActionResponse {
    actions::orders::convert_quotation(&state, &session, id).await
}

pub async fn mark_ready(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> ActionResponse {
    actions::orders::mark_ready(&state, &session, id).await
}

pub async fn complete_collection(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> ActionResponse {
    actions::orders::complete_collection(&state, &session, id).await
}

pub async fn reverse_order(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::orders::reverse_order(&state, &session, id, payload).await
}

pub async fn reverse_payment(
    State(state): State<AppState>,
    session: SessionContext,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> ActionResponse {
    actions::orders::reverse_payment(&state, &session, payment_id, payload).await
}
