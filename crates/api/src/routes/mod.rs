//! Route handlers.

pub mod catalog;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod users;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the id of the user performing the request.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The acting user, read from the [`USER_ID_HEADER`] header.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;

        Uuid::parse_str(value)
            .map(|uuid| ActingUser(UserId::from_uuid(uuid)))
            .map_err(|e| ApiError::Unauthorized(format!("invalid {USER_ID_HEADER}: {e}")))
    }
}

/// Parses a path segment into a typed id.
pub(crate) fn parse_id<I: From<Uuid>>(id: &str) -> Result<I, ApiError> {
    let uuid = Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(I::from(uuid))
}
