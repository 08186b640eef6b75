//! Extractors for the authenticated account.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::{authenticate, bearer_token, UserAuth};

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuth>() {
            return Ok(auth.clone());
        }
        authenticate(state, &parts.headers).await
    }
}

/// The authenticated account, when the request carries a usable token.
///
/// A missing token yields `None`. A token that is present but invalid also
/// yields `None`; callers that need an identity answer 401 themselves.
#[derive(Debug, Clone)]
pub struct OptionalUserAuth(pub Option<UserAuth>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalUserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuth>() {
            return Ok(OptionalUserAuth(Some(auth.clone())));
        }
        if bearer_token(&parts.headers).is_none() {
            return Ok(OptionalUserAuth(None));
        }
        match authenticate(state, &parts.headers).await {
            Ok(auth) => Ok(OptionalUserAuth(Some(auth))),
            Err(ApiError::Unauthorized(_)) => Ok(OptionalUserAuth(None)),
            Err(e) => Err(e),
        }
    }
}
