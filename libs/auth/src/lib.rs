//! Authenticated-identity extraction for the Bookmart HTTP API.
//!
//! Authentication itself happens upstream (API gateway): the gateway
//! terminates the session and injects `x-user-id` and `x-user-role` headers.
//! This crate only turns those trusted headers into a typed [`AuthUser`] and
//! enforces the role gate for admin-only routes.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// The authenticated caller. Extract it in any handler that needs identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Extractor that additionally requires the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or invalid {USER_ID_HEADER} header")]
    MissingIdentity,
    #[error("missing or invalid {USER_ROLE_HEADER} header")]
    InvalidRole,
    #[error("admin role required")]
    Forbidden,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::MissingIdentity | AuthError::InvalidRole => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        };

        tracing::warn!(error = %self, status = status.as_u16(), "authentication rejected");

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Check if already extracted earlier in this request
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or(AuthError::MissingIdentity)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(Role::parse)
            .ok_or(AuthError::InvalidRole)?;

        let user = AuthUser { id, role };
        parts.extensions.insert(user);
        Ok(user)
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, "non-admin caller on admin route");
            return Err(AuthError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
