//! Extractor for the intro authorized by the ownership guard.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::middleware::authorization::IntroScope;

#[async_trait]
impl<S> FromRequestParts<S> for IntroScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<IntroScope>().copied().ok_or_else(|| {
            ApiError::Internal("Intro route registered without the ownership guard".to_string())
        })
    }
}
