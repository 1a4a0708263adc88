use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::backoffice::{BatchRequest, BranchRequest, ProductRequest, StockAdjustmentRequest};
use crate::revalidate::routes;
use crate::session::SessionContext;
use crate::validation::{
    CODE_MAX_LEN, NAME_MAX_LEN, PHONE_MAX_LEN, REASON_MAX_LEN, SKU_MAX_LEN, ValidationError,
    validate_nonzero_quantity, validate_phone, validate_positive_amount, validate_positive_quantity,
};

use super::{
    ActionResponse, optional_text, optional_uuid, parse_input, require_amount, require_integer,
    require_text, require_uuid,
};

fn optional_flag(
    field: &'static str,
    value: Option<&str>,
    default: bool,
    errors: &mut Vec<ValidationError>,
) -> bool {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => default,
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => true,
            "false" | "0" | "off" | "no" => false,
            _ => {
                errors.push(ValidationError::new(field, "must be true or false"));
                default
            }
        },
    }
}

fn optional_date(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<ValidationError>,
) -> Option<DateTime<Utc>> {
    let raw = value.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Some(Utc.from_utc_datetime(&midnight));
    }

    errors.push(ValidationError::new(field, "must be a date (YYYY-MM-DD)"));
    None
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BranchInput {
    name: Option<String>,
    code: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    active: Option<String>,
}

fn validate_branch(payload: &Value) -> Result<BranchRequest, ActionResponse> {
    let input: BranchInput = parse_input(payload)?;

    let mut errors = Vec::new();
    let name = require_text("name", input.name.as_deref(), NAME_MAX_LEN, &mut errors);
    let code = require_text("code", input.code.as_deref(), CODE_MAX_LEN, &mut errors);
    let address = optional_text("address", input.address.as_deref(), NAME_MAX_LEN, &mut errors);
    let phone = optional_text("phone", input.phone.as_deref(), PHONE_MAX_LEN, &mut errors)
        .and_then(|value| match validate_phone("phone", &value) {
            Ok(()) => Some(value),
            Err(err) => {
                errors.push(err);
                None
            }
        });
    let active = optional_flag("active", input.active.as_deref(), true, &mut errors);

    if !errors.is_empty() {
        return Err(ActionResponse::rejected(errors, payload));
    }
    let (Some(name), Some(code)) = (name, code) else {
        return Err(ActionResponse::rejected(errors, payload));
    };

    Ok(BranchRequest {
        name,
        code,
        address,
        phone,
        active,
    })
}

pub async fn create_branch(
    state: &AppState,
    session: &SessionContext,
    payload: Value,
) -> ActionResponse {
    let request = match validate_branch(&payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.backoffice.create_branch(&session.token, &request).await {
        Ok(branch) => {
            let revalidated = vec![routes::BRANCHES.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Branch created",
                serde_json::to_value(&branch).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

pub async fn update_branch(
    state: &AppState,
    session: &SessionContext,
    id: Uuid,
    payload: Value,
) -> ActionResponse {
    let request = match validate_branch(&payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state
        .backoffice
        .update_branch(&session.token, id, &request)
        .await
    {
        Ok(branch) => {
            let revalidated = vec![routes::BRANCHES.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Branch updated",
                serde_json::to_value(&branch).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

pub async fn delete_branch(state: &AppState, session: &SessionContext, id: Uuid) -> ActionResponse {
    match state.backoffice.delete_branch(&session.token, id).await {
        Ok(()) => {
            let revalidated = vec![routes::BRANCHES.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded("Branch deleted", None, revalidated)
        }
        Err(err) => ActionResponse::failed(err, &Value::Null),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductInput {
    name: Option<String>,
    sku: Option<String>,
    category: Option<String>,
    price: Option<String>,
    description: Option<String>,
    active: Option<String>,
}

fn validate_product(payload: &Value) -> Result<ProductRequest, ActionResponse> {
    let input: ProductInput = parse_input(payload)?;

    let mut errors = Vec::new();
    let name = require_text("name", input.name.as_deref(), NAME_MAX_LEN, &mut errors);
    let sku = require_text("sku", input.sku.as_deref(), SKU_MAX_LEN, &mut errors);
    let category = require_text("category", input.category.as_deref(), NAME_MAX_LEN, &mut errors);
    let price = require_amount("price", input.price.as_deref(), &mut errors);
    if let Some(price) = &price {
        if let Err(err) = validate_positive_amount("price", price) {
            errors.push(err);
        }
    }
    let description = optional_text(
        "description",
        input.description.as_deref(),
        REASON_MAX_LEN,
        &mut errors,
    );
    let active = optional_flag("active", input.active.as_deref(), true, &mut errors);

    if !errors.is_empty() {
        return Err(ActionResponse::rejected(errors, payload));
    }
    let (Some(name), Some(sku), Some(category), Some(price)) = (name, sku, category, price) else {
        return Err(ActionResponse::rejected(errors, payload));
    };

    Ok(ProductRequest {
        name,
        sku,
        category,
        price,
        description,
        active,
    })
}

pub async fn create_product(
    state: &AppState,
    session: &SessionContext,
    payload: Value,
) -> ActionResponse {
    let request = match validate_product(&payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state
        .backoffice
        .create_product(&session.token, &request)
        .await
    {
        Ok(product) => {
            let revalidated = vec![routes::PRODUCTS.to_string(), routes::INVENTORY.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Product created",
                serde_json::to_value(&product).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

pub async fn update_product(
    state: &AppState,
    session: &SessionContext,
    id: Uuid,
    payload: Value,
) -> ActionResponse {
    let request = match validate_product(&payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state
        .backoffice
        .update_product(&session.token, id, &request)
        .await
    {
        Ok(product) => {
            let revalidated = vec![routes::PRODUCTS.to_string(), routes::INVENTORY.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Product updated",
                serde_json::to_value(&product).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

pub async fn delete_product(state: &AppState, session: &SessionContext, id: Uuid) -> ActionResponse {
    match state.backoffice.delete_product(&session.token, id).await {
        Ok(()) => {
            let revalidated = vec![routes::PRODUCTS.to_string(), routes::INVENTORY.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded("Product deleted", None, revalidated)
        }
        Err(err) => ActionResponse::failed(err, &Value::Null),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchInput {
    product_id: Option<String>,
    branch_id: Option<String>,
    quantity: Option<String>,
    unit_cost: Option<String>,
    expiry_date: Option<String>,
}

fn validate_batch(payload: &Value, session: &SessionContext) -> Result<BatchRequest, ActionResponse> {
    let input: BatchInput = parse_input(payload)?;

    let mut errors = Vec::new();
    let product_id = require_uuid("productId", input.product_id.as_deref(), &mut errors);

    let requested_branch = optional_uuid("branchId", input.branch_id.as_deref(), &mut errors);
    let branch_id = session.effective_branch(requested_branch);
    if branch_id.is_none() {
        errors.push(ValidationError::new("branchId", "must not be empty"));
    }

    let quantity = require_integer("quantity", input.quantity.as_deref(), &mut errors);
    if let Some(quantity) = quantity {
        if let Err(err) = validate_positive_quantity("quantity", quantity) {
            errors.push(err);
        }
    }

    let unit_cost = require_amount("unitCost", input.unit_cost.as_deref(), &mut errors);
    if let Some(unit_cost) = &unit_cost {
        if let Err(err) = validate_positive_amount("unitCost", unit_cost) {
            errors.push(err);
        }
    }

    let expiry_date = optional_date("expiryDate", input.expiry_date.as_deref(), &mut errors);

    if !errors.is_empty() {
        return Err(ActionResponse::rejected(errors, payload));
    }
    let (Some(product_id), Some(branch_id), Some(quantity), Some(unit_cost)) =
        (product_id, branch_id, quantity, unit_cost)
    else {
        return Err(ActionResponse::rejected(errors, payload));
    };

    Ok(BatchRequest {
        product_id,
        branch_id,
        quantity,
        unit_cost,
        expiry_date,
    })
}

pub async fn create_batch(
    state: &AppState,
    session: &SessionContext,
    payload: Value,
) -> ActionResponse {
    let request = match validate_batch(&payload, session) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.backoffice.create_batch(&session.token, &request).await {
        Ok(batch) => {
            let revalidated = vec![routes::BATCHES.to_string(), routes::INVENTORY.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Batch received",
                serde_json::to_value(&batch).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

pub async fn update_batch(
    state: &AppState,
    session: &SessionContext,
    id: Uuid,
    payload: Value,
) -> ActionResponse {
    let request = match validate_batch(&payload, session) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state
        .backoffice
        .update_batch(&session.token, id, &request)
        .await
    {
        Ok(batch) => {
            let revalidated = vec![routes::BATCHES.to_string(), routes::INVENTORY.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Batch updated",
                serde_json::to_value(&batch).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

pub async fn delete_batch(state: &AppState, session: &SessionContext, id: Uuid) -> ActionResponse {
    match state.backoffice.delete_batch(&session.token, id).await {
        Ok(()) => {
            let revalidated = vec![routes::BATCHES.to_string(), routes::INVENTORY.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded("Batch deleted", None, revalidated)
        }
        Err(err) => ActionResponse::failed(err, &Value::Null),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockAdjustmentInput {
    product_id: Option<String>,
    branch_id: Option<String>,
    quantity_delta: Option<String>,
    reason: Option<String>,
}

pub async fn adjust_stock(
    state: &AppState,
    session: &SessionContext,
    payload: Value,
) -> ActionResponse {
    let input: StockAdjustmentInput = match parse_input(&payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let mut errors = Vec::new();
    let product_id = require_uuid("productId", input.product_id.as_deref(), &mut errors);

    let requested_branch = optional_uuid("branchId", input.branch_id.as_deref(), &mut errors);
    let branch_id = session.effective_branch(requested_branch);
    if branch_id.is_none() {
        errors.push(ValidationError::new("branchId", "must not be empty"));
    }

    let quantity_delta = require_integer("quantityDelta", input.quantity_delta.as_deref(), &mut errors);
    if let Some(delta) = quantity_delta {
        if let Err(err) = validate_nonzero_quantity("quantityDelta", delta) {
            errors.push(err);
        }
    }

    let reason = require_text("reason", input.reason.as_deref(), REASON_MAX_LEN, &mut errors);

    if !errors.is_empty() {
        return ActionResponse::rejected(errors, &payload);
    }
    let (Some(product_id), Some(branch_id), Some(quantity_delta), Some(reason)) =
        (product_id, branch_id, quantity_delta, reason)
    else {
        return ActionResponse::rejected(errors, &payload);
    };

    let request = StockAdjustmentRequest {
        product_id,
        branch_id,
        quantity_delta,
        reason,
    };

    match state.backoffice.adjust_stock(&session.token, &request).await {
        Ok(level) => {
            let revalidated = vec![
                routes::INVENTORY.to_string(),
                routes::INVENTORY_REPORT.to_string(),
            ];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Stock adjusted",
                serde_json::to_value(&level).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}
