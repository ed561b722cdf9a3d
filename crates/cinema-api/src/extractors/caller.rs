//! `Caller` extractor: reads the identity forwarded by the authentication
//! gateway in the `x-user-id` and `x-user-role` headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use cinema_core::error::AppError;
use cinema_core::types::UserId;
use cinema_entity::user::UserRole;
use cinema_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the numeric user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller role (`USER` or `ADMIN`).
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Identity of the caller available in handlers.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl std::ops::Deref for Caller {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        };

        let user_id: UserId = header(USER_ID_HEADER)
            .ok_or_else(|| AppError::unauthorized("Missing x-user-id header"))?
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid x-user-id header"))?;

        // Absent role means a regular customer.
        let role = match header(USER_ROLE_HEADER) {
            Some(value) => value.parse::<UserRole>()?,
            None => UserRole::User,
        };

        Ok(Caller(RequestContext::new(user_id, role)))
    }
}
