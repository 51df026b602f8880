use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Header the authenticating proxy sets to the signed-in user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| CurrentUser(value.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}
