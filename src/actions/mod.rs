//! Server actions.
//! Every mutation the console exposes goes through the same contract:
//! shape-validate the submitted payload collecting all field errors, forward
//! to the backoffice with the session bearer, then bump the revisions of the
//! routes that render the touched entities. Failures echo the submitted
//! values so a form can re-render with input preserved, and carry the
//! backoffice's own error message when it gave one. No retries, no
//! idempotency keys, no partial-failure semantics.

pub mod catalog;
pub mod customers;
pub mod orders;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use bigdecimal::BigDecimal;

use crate::backoffice::BackofficeError;
use crate::validation::{ValidationError, parse_amount, sanitize_string, validate_max_len};

/// Uniform result envelope for every server action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub values: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revalidated: Vec<String>,
}

impl ActionResponse {
    pub fn succeeded(message: impl Into<String>, data: Option<Value>, revalidated: Vec<String>) -> Self {
        ActionResponse {
            success: true,
            message: message.into(),
            errors: None,
            values: None,
            data,
            revalidated,
        }
    }

    /// Shape validation failed: all field errors plus the original payload
    /// so the form re-renders with input preserved.
    pub fn rejected(errors: Vec<ValidationError>, values: &Value) -> Self {
        let errors = errors
            .into_iter()
            .map(|e| (e.field.to_string(), e.message))
            .collect();

        ActionResponse {
            success: false,
            message: "Validation failed".to_string(),
            errors: Some(errors),
            values: Some(values.clone()),
            data: None,
            revalidated: Vec::new(),
        }
    }

    /// The backoffice call failed. Nothing was revalidated. Actions without
    /// form input pass `Value::Null` and the echo is omitted.
    pub fn failed(err: BackofficeError, values: &Value) -> Self {
        tracing::error!("backoffice call failed: {}", err);

        ActionResponse {
            success: false,
            message: err.display_message(),
            errors: None,
            values: if values.is_null() {
                None
            } else {
                Some(values.clone())
            },
            data: None,
            revalidated: Vec::new(),
        }
    }
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else if self.errors.is_some() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::BAD_GATEWAY
        };

        (status, Json(self)).into_response()
    }
}

/// Deserializes the submitted payload into an action's input shape. Inputs
/// are all-optional text fields (form semantics), so this only fails when
/// the payload is not an object of the expected JSON types.
pub(crate) fn parse_input<T: DeserializeOwned>(payload: &Value) -> Result<T, ActionResponse> {
    serde_json::from_value(payload.clone()).map_err(|_| {
        ActionResponse::rejected(
            vec![ValidationError::new(
                "payload",
                "must be a JSON object with text fields",
            )],
            payload,
        )
    })
}

pub(crate) fn require_text(
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    let cleaned = value.map(sanitize_string).unwrap_or_default();
    if cleaned.is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
        return None;
    }
    if let Err(err) = validate_max_len(field, &cleaned, max_len) {
        errors.push(err);
        return None;
    }
    Some(cleaned)
}

pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    let cleaned = value.map(sanitize_string).unwrap_or_default();
    if cleaned.is_empty() {
        return None;
    }
    if let Err(err) = validate_max_len(field, &cleaned, max_len) {
        errors.push(err);
        return None;
    }
    Some(cleaned)
}

pub(crate) fn require_uuid(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<ValidationError>,
) -> Option<Uuid> {
    let cleaned = value.map(str::trim).unwrap_or_default();
    if cleaned.is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
        return None;
    }
    match Uuid::parse_str(cleaned) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(ValidationError::new(field, "must be a valid id"));
            None
        }
    }
}

pub(crate) fn optional_uuid(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<ValidationError>,
) -> Option<Uuid> {
    let cleaned = value.map(str::trim).unwrap_or_default();
    if cleaned.is_empty() {
        return None;
    }
    match Uuid::parse_str(cleaned) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(ValidationError::new(field, "must be a valid id"));
            None
        }
    }
}

pub(crate) fn require_amount(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<ValidationError>,
) -> Option<BigDecimal> {
    match parse_amount(field, value.unwrap_or_default()) {
        Ok(amount) => Some(amount),
        Err(err) => {
            errors.push(err);
            None
        }
    }
}

pub(crate) fn require_integer(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<ValidationError>,
) -> Option<i64> {
    let cleaned = value.map(str::trim).unwrap_or_default();
    if cleaned.is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
        return None;
    }
    match cleaned.parse::<i64>() {
        Ok(number) => Some(number),
        Err(_) => {
            errors.push(ValidationError::new(field, "must be a whole number"));
            None
        }
    }
}
