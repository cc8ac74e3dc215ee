//! Author identity supplied by the HTTP layer.
//!
//! Accounts and sessions live outside this service; an upstream gateway
//! forwards the authenticated user's id in the `x-author-id` header.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Header carrying the acting author's id
pub const AUTHOR_HEADER: &str = "x-author-id";

/// The author on whose behalf a request acts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAuthor(pub Uuid);

impl AuthenticatedAuthor {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAuthor
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(AUTHOR_HEADER)
            .ok_or_else(|| ServiceError::Unauthorized(format!("missing {} header", AUTHOR_HEADER)))?;

        raw.to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(AuthenticatedAuthor)
            .ok_or_else(|| {
                ServiceError::Unauthorized(format!("{} must be a UUID", AUTHOR_HEADER))
            })
    }
}
