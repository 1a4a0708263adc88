//! Per-request session context.
//! The console never reads session state ambiently: every handler that needs
//! the caller's identity takes this context as an explicit argument, filled
//! from headers the fronting session layer sets. Token issuance and
//! verification live outside this service; the bearer is forwarded to the
//! backoffice untouched.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    Cashier,
}

impl Role {
    fn from_header(value: &str) -> Role {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            "MANAGER" => Role::Manager,
            _ => Role::Cashier,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
    pub role: Role,
    pub branch_id: Option<Uuid>,
}

impl SessionContext {
    /// Branch scoping rule: an explicit request wins; otherwise non-admin
    /// sessions fall back to their home branch while admins stay unscoped.
    pub fn effective_branch(&self, requested: Option<Uuid>) -> Option<Uuid> {
        requested.or(if self.role.is_admin() {
            None
        } else {
            self.branch_id
        })
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let role = parts
            .headers
            .get("x-console-role")
            .and_then(|header| header.to_str().ok())
            .map(Role::from_header)
            .unwrap_or(Role::Cashier);

        let branch_id = parts
            .headers
            .get("x-console-branch")
            .and_then(|header| header.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok());

        Ok(SessionContext {
            token,
            role,
            branch_id,
        })
    }
}
