//! Identity boundary.
//!
//! Authentication itself happens upstream (the gateway verifies the session
//! and attaches the opaque user identity as a request header). This module
//! only lifts that identity into handlers; it does not re-validate it.

use axum::{extract::FromRequestParts, http::request::Parts};
use thiserror::Error;

use crate::api::ApiError;

/// Header the upstream auth layer uses to attach the verified identity.
pub const IDENTITY_HEADER: &str = "x-authenticated-user";

/// Authentication boundary errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing identity header")]
    MissingIdentity,
    #[error("malformed identity header")]
    InvalidIdentity,
}

/// The authenticated user attached to the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    id: String,
}

impl CurrentUser {
    /// The opaque user identity. Used as the hub routing key.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn into_id(self) -> String {
        self.id
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(IDENTITY_HEADER)
            .ok_or(AuthError::MissingIdentity)?;
        let id = value.to_str().map_err(|_| AuthError::InvalidIdentity)?;
        if id.is_empty() || id.chars().any(char::is_control) {
            return Err(AuthError::InvalidIdentity.into());
        }
        Ok(CurrentUser { id: id.to_string() })
    }
}
