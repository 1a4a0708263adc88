use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::backoffice::{CreateOrderRequest, OrderItemRequest, PaymentRequest, ReversalRequest};
use crate::revalidate::routes;
use crate::session::SessionContext;
use crate::validation::{
    ALLOWED_ORDER_TYPES, ALLOWED_PAYMENT_METHODS, NOTES_MAX_LEN, REASON_MAX_LEN,
    REFERENCE_MAX_LEN, ValidationError, validate_enum, validate_positive_amount,
    validate_within_balance,
};

use super::{
    ActionResponse, optional_text, optional_uuid, parse_input, require_amount, require_text,
    require_uuid,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderItemInput {
    product_id: Option<String>,
    quantity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderInput {
    customer_id: Option<String>,
    branch_id: Option<String>,
    order_type: Option<String>,
    #[serde(default)]
    items: Vec<OrderItemInput>,
    plan_months: Option<String>,
    notes: Option<String>,
}

pub async fn create_order(
    state: &AppState,
    session: &SessionContext,
    payload: Value,
) -> ActionResponse {
    let input: CreateOrderInput = match parse_input(&payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let mut errors = Vec::new();

    let customer_id = require_uuid("customerId", input.customer_id.as_deref(), &mut errors);

    let requested_branch = optional_uuid("branchId", input.branch_id.as_deref(), &mut errors);
    let branch_id = session.effective_branch(requested_branch);
    if branch_id.is_none() {
        errors.push(ValidationError::new("branchId", "must not be empty"));
    }

    let order_type = require_text("orderType", input.order_type.as_deref(), 32, &mut errors)
        .and_then(|value| match validate_enum("orderType", &value, ALLOWED_ORDER_TYPES) {
            Ok(()) => Some(value),
            Err(err) => {
                errors.push(err);
                None
            }
        });

    if input.items.is_empty() {
        errors.push(ValidationError::new("items", "must contain at least one item"));
    }
    let mut items = Vec::with_capacity(input.items.len());
    for (index, item) in input.items.iter().enumerate() {
        let position = index + 1;
        let product_id = item
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|raw| Uuid::parse_str(raw).ok());
        let quantity = item
            .quantity
            .as_deref()
            .map(str::trim)
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|q| *q > 0);

        match (product_id, quantity) {
            (Some(product_id), Some(quantity)) => items.push(OrderItemRequest {
                product_id,
                quantity,
            }),
            (None, _) => errors.push(ValidationError::new(
                "items",
                format!("item {position}: productId must be a valid id"),
            )),
            (_, None) => errors.push(ValidationError::new(
                "items",
                format!("item {position}: quantity must be a positive whole number"),
            )),
        }
    }

    let plan_months = if order_type.as_deref() == Some("LAYAWAY") {
        match input
            .plan_months
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|months| (1..=36).contains(months))
        {
            Some(months) => Some(months),
            None => {
                errors.push(ValidationError::new(
                    "planMonths",
                    "must be between 1 and 36 for layaway orders",
                ));
                None
            }
        }
    } else {
        None
    };

    let notes = optional_text("notes", input.notes.as_deref(), NOTES_MAX_LEN, &mut errors);

    if !errors.is_empty() {
        return ActionResponse::rejected(errors, &payload);
    }

    let (Some(customer_id), Some(branch_id), Some(order_type)) =
        (customer_id, branch_id, order_type)
    else {
        return ActionResponse::rejected(errors, &payload);
    };

    let request = CreateOrderRequest {
        customer_id,
        branch_id,
        order_type,
        items,
        plan_months,
        notes,
    };

    match state.backoffice.create_order(&session.token, &request).await {
        Ok(order) => {
            let revalidated = vec![
                routes::ORDERS.to_string(),
                routes::INVENTORY.to_string(),
                routes::SALES_REPORT.to_string(),
            ];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Order created",
                serde_json::to_value(&order).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentInput {
    amount: Option<String>,
    balance_amount: Option<String>,
    payment_method: Option<String>,
    reference: Option<String>,
    notes: Option<String>,
}

/// Layaway payment submission. The form posts back the balance it rendered
/// so the guard `0 < amount <= balance` runs before the backoffice is ever
/// contacted; the backoffice re-validates against live state regardless.
pub async fn process_payment(
    state: &AppState,
    session: &SessionContext,
    order_id: Uuid,
    payload: Value,
) -> ActionResponse {
    let input: PaymentInput = match parse_input(&payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let mut errors = Vec::new();

    let amount = require_amount("amount", input.amount.as_deref(), &mut errors);
    if let Some(amount) = &amount {
        if let Err(err) = validate_positive_amount("amount", amount) {
            errors.push(err);
        }
    }
    let balance = require_amount("balanceAmount", input.balance_amount.as_deref(), &mut errors);
    if let (Some(amount), Some(balance)) = (&amount, &balance) {
        if let Err(err) = validate_within_balance("amount", amount, balance) {
            errors.push(err);
        }
    }

    let payment_method = require_text(
        "paymentMethod",
        input.payment_method.as_deref(),
        32,
        &mut errors,
    )
    .and_then(|value| {
        match validate_enum("paymentMethod", &value, ALLOWED_PAYMENT_METHODS) {
            Ok(()) => Some(value),
            Err(err) => {
                errors.push(err);
                None
            }
        }
    });

    let reference = optional_text(
        "reference",
        input.reference.as_deref(),
        REFERENCE_MAX_LEN,
        &mut errors,
    );
    let notes = optional_text("notes", input.notes.as_deref(), NOTES_MAX_LEN, &mut errors);

    if !errors.is_empty() {
        return ActionResponse::rejected(errors, &payload);
    }

    let (Some(amount), Some(payment_method)) = (amount, payment_method) else {
        return ActionResponse::rejected(errors, &payload);
    };

    let request = PaymentRequest {
        amount,
        payment_method,
        reference,
        notes,
    };

    match state
        .backoffice
        .process_payment(&session.token, order_id, &request)
        .await
    {
        Ok(payment) => {
            let revalidated = vec![
                routes::ORDERS.to_string(),
                routes::order_detail(order_id),
                routes::SALES_REPORT.to_string(),
            ];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Payment recorded",
                serde_json::to_value(&payment).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

pub async fn convert_quotation(
    state: &AppState,
    session: &SessionContext,
    order_id: Uuid,
) -> ActionResponse {
    match state
        .backoffice
        .convert_quotation(&session.token, order_id)
        .await
    {
        Ok(order) => {
            let revalidated = vec![routes::ORDERS.to_string(), routes::order_detail(order_id)];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Quotation converted to order",
                serde_json::to_value(&order).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &Value::Null),
    }
}

pub async fn mark_ready(
    state: &AppState,
    session: &SessionContext,
    order_id: Uuid,
) -> ActionResponse {
    match state.backoffice.mark_ready(&session.token, order_id).await {
        Ok(order) => {
            let revalidated = vec![routes::ORDERS.to_string(), routes::order_detail(order_id)];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Order marked ready for collection",
                serde_json::to_value(&order).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &Value::Null),
    }
}

pub async fn complete_collection(
    state: &AppState,
    session: &SessionContext,
    order_id: Uuid,
) -> ActionResponse {
    match state
        .backoffice
        .complete_collection(&session.token, order_id)
        .await
    {
        Ok(order) => {
            let revalidated = vec![
                routes::ORDERS.to_string(),
                routes::order_detail(order_id),
                routes::INVENTORY.to_string(),
            ];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Collection completed",
                serde_json::to_value(&order).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &Value::Null),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReversalInput {
    reason: Option<String>,
}

pub async fn reverse_order(
    state: &AppState,
    session: &SessionContext,
    order_id: Uuid,
    payload: Value,
) -> ActionResponse {
    let input: ReversalInput = match parse_input(&payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let mut errors = Vec::new();
    let reason = require_text("reason", input.reason.as_deref(), REASON_MAX_LEN, &mut errors);

    let Some(reason) = reason else {
        return ActionResponse::rejected(errors, &payload);
    };

    match state
        .backoffice
        .reverse_order(&session.token, order_id, &ReversalRequest { reason })
        .await
    {
        Ok(order) => {
            let revalidated = vec![
                routes::ORDERS.to_string(),
                routes::order_detail(order_id),
                routes::SALES_REPORT.to_string(),
                routes::INVENTORY.to_string(),
            ];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Order reversed",
                serde_json::to_value(&order).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReversePaymentInput {
    order_id: Option<String>,
    reason: Option<String>,
}

pub async fn reverse_payment(
    state: &AppState,
    session: &SessionContext,
    payment_id: Uuid,
    payload: Value,
) -> ActionResponse {
    let input: ReversePaymentInput = match parse_input(&payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let mut errors = Vec::new();
    let order_id = require_uuid("orderId", input.order_id.as_deref(), &mut errors);
    let reason = require_text("reason", input.reason.as_deref(), REASON_MAX_LEN, &mut errors);

    let (Some(order_id), Some(reason)) = (order_id, reason) else {
        return ActionResponse::rejected(errors, &payload);
    };

    match state
        .backoffice
        .reverse_payment(&session.token, payment_id, &ReversalRequest { reason })
        .await
    {
        Ok(payment) => {
            let revalidated = vec![
                routes::ORDERS.to_string(),
                routes::order_detail(order_id),
                routes::SALES_REPORT.to_string(),
            ];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Payment reversed",
                serde_json::to_value(&payment).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}
