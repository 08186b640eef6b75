//! Bearer token authentication for dashboard and admin routes.
//!
//! A request passes only with a valid access token whose account still exists
//! and is active. The role is taken from the account row, so a demotion takes
//! effect before the token expires.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use domain::models::AccountRole;
use domain::services::authorization::Caller;
use persistence::repositories::AccountRepository;
use shared::jwt::{extract_account_id, JwtConfig, JwtError};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated account, stored in request extensions.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub account_id: Uuid,
    pub role: AccountRole,
    /// JWT ID of the access token.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token. The role comes from the claims and is
    /// refreshed from the database by [`require_user_auth`].
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, JwtError> {
        let claims = jwt_config.validate_access_token(token)?;
        let account_id = extract_account_id(&claims)?;
        let role = claims
            .role
            .parse::<AccountRole>()
            .map_err(|_| JwtError::InvalidToken)?;

        Ok(UserAuth {
            account_id,
            role,
            jti: claims.jti,
        })
    }

    pub fn caller(&self) -> Caller {
        Caller {
            account_id: self.account_id,
            role: self.role,
        }
    }
}

/// The bearer token of a request, if it carries one.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Validates the bearer token and checks the account is still active.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserAuth, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| {
        ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
    })?;

    let mut auth = UserAuth::validate(&state.jwt, &token).map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let account = AccountRepository::new(state.pool.clone())
        .find_by_id(auth.account_id)
        .await?
        .filter(|a| a.is_active)
        .ok_or_else(|| ApiError::Unauthorized("Account is not active".to_string()))?;

    auth.role = account.role.into();
    Ok(auth)
}

/// Middleware that requires a valid access token.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, req.headers()).await {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}
