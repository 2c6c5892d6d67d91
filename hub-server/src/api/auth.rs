//! Identity extraction and role checks
//!
//! Identity is an external collaborator: a trusted front proxy authenticates
//! the caller and forwards its claim in `X-User-Id` and `X-Role` headers.
//! This module materializes that claim as a `CurrentUser` and guards the
//! admin route group.

use crate::api::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use hub_common::models::UserRole;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-role";

/// Authenticated caller identity
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

fn parse_identity(parts: &Parts) -> Result<CurrentUser, ApiError> {
    let id = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::PermissionDenied("missing user identity".to_string()))?
        .to_string();

    let role = parts
        .headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::PermissionDenied("missing role claim".to_string()))?;

    let role = UserRole::parse(role)
        .map_err(|_| ApiError::PermissionDenied(format!("unknown role: {}", role)))?;

    Ok(CurrentUser { id, role })
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_identity(parts)
    }
}

/// Middleware guarding the /api/admin route group
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let user = parse_identity(&parts)?;

    if !user.is_admin() {
        return Err(ApiError::PermissionDenied(
            "admin role required".to_string(),
        ));
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
