use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::backoffice::{CustomerRequest, ReferralRequest};
use crate::revalidate::routes;
use crate::session::SessionContext;
use crate::validation::{
    EMAIL_MAX_LEN, NAME_MAX_LEN, PHONE_MAX_LEN, ValidationError, validate_email, validate_phone,
};

use super::{ActionResponse, optional_text, optional_uuid, parse_input, require_text, require_uuid};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerInput {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    id_number: Option<String>,
    branch_id: Option<String>,
}

fn validate_customer(
    payload: &Value,
    session: &SessionContext,
) -> Result<CustomerRequest, ActionResponse> {
    let input: CustomerInput = parse_input(payload)?;

    let mut errors = Vec::new();
    let first_name = require_text("firstName", input.first_name.as_deref(), NAME_MAX_LEN, &mut errors);
    let last_name = require_text("lastName", input.last_name.as_deref(), NAME_MAX_LEN, &mut errors);

    let phone = require_text("phone", input.phone.as_deref(), PHONE_MAX_LEN, &mut errors)
        .and_then(|value| match validate_phone("phone", &value) {
            Ok(()) => Some(value),
            Err(err) => {
                errors.push(err);
                None
            }
        });

    let email = optional_text("email", input.email.as_deref(), EMAIL_MAX_LEN, &mut errors)
        .and_then(|value| match validate_email("email", &value) {
            Ok(()) => Some(value),
            Err(err) => {
                errors.push(err);
                None
            }
        });

    let id_number = optional_text("idNumber", input.id_number.as_deref(), 32, &mut errors);

    let requested_branch = optional_uuid("branchId", input.branch_id.as_deref(), &mut errors);
    let branch_id = session.effective_branch(requested_branch);
    if branch_id.is_none() {
        errors.push(ValidationError::new("branchId", "must not be empty"));
    }

    if !errors.is_empty() {
        return Err(ActionResponse::rejected(errors, payload));
    }
    let (Some(first_name), Some(last_name), Some(phone), Some(branch_id)) =
        (first_name, last_name, phone, branch_id)
    else {
        return Err(ActionResponse::rejected(errors, payload));
    };

    Ok(CustomerRequest {
        first_name,
        last_name,
        phone,
        email,
        id_number,
        branch_id,
    })
}

pub async fn create_customer(
    state: &AppState,
    session: &SessionContext,
    payload: Value,
) -> ActionResponse {
    let request = match validate_customer(&payload, session) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state
        .backoffice
        .create_customer(&session.token, &request)
        .await
    {
        Ok(customer) => {
            let revalidated = vec![routes::CUSTOMERS.to_string()];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Customer created",
                serde_json::to_value(&customer).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

pub async fn update_customer(
    state: &AppState,
    session: &SessionContext,
    id: Uuid,
    payload: Value,
) -> ActionResponse {
    let request = match validate_customer(&payload, session) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state
        .backoffice
        .update_customer(&session.token, id, &request)
        .await
    {
        Ok(customer) => {
            let revalidated = vec![
                routes::CUSTOMERS.to_string(),
                routes::customer_detail(id),
            ];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Customer updated",
                serde_json::to_value(&customer).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferralInput {
    referrer_id: Option<String>,
    referred_name: Option<String>,
    referred_phone: Option<String>,
}

pub async fn create_referral(
    state: &AppState,
    session: &SessionContext,
    payload: Value,
) -> ActionResponse {
    let input: ReferralInput = match parse_input(&payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let mut errors = Vec::new();
    let referrer_id = require_uuid("referrerId", input.referrer_id.as_deref(), &mut errors);
    let referred_name = require_text(
        "referredName",
        input.referred_name.as_deref(),
        NAME_MAX_LEN,
        &mut errors,
    );
    let referred_phone = require_text(
        "referredPhone",
        input.referred_phone.as_deref(),
        PHONE_MAX_LEN,
        &mut errors,
    )
    .and_then(|value| match validate_phone("referredPhone", &value) {
        Ok(()) => Some(value),
        Err(err) => {
            errors.push(err);
            None
        }
    });

    if !errors.is_empty() {
        return ActionResponse::rejected(errors, &payload);
    }
    let (Some(referrer_id), Some(referred_name), Some(referred_phone)) =
        (referrer_id, referred_name, referred_phone)
    else {
        return ActionResponse::rejected(errors, &payload);
    };

    let request = ReferralRequest {
        referrer_id,
        referred_name,
        referred_phone,
    };

    match state
        .backoffice
        .create_referral(&session.token, &request)
        .await
    {
        Ok(referral) => {
            let revalidated = vec![
                routes::REFERRALS.to_string(),
                routes::customer_detail(referrer_id),
            ];
            state.revalidator.invalidate(&revalidated).await;
            ActionResponse::succeeded(
                "Referral recorded",
                serde_json::to_value(&referral).ok(),
                revalidated,
            )
        }
        Err(err) => ActionResponse::failed(err, &payload),
    }
}
