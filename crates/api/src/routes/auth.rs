//! Authentication routes: login, token refresh, logout and the caller's account.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::account::{ChangePasswordRequest, LoginRequest, RefreshRequest};
use domain::models::Account;
use persistence::repositories::AccountRepository;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::auth::{AuthResult, AuthService};

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.pool.clone(), state.jwt.clone())
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResult>, ApiError> {
    request.validate()?;
    let result = auth_service(&state)
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/auth/refresh
///
/// Rotates the refresh token; the presented one is spent.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResult>, ApiError> {
    request.validate()?;
    let result = auth_service(&state).refresh(&request.refresh_token).await?;
    Ok(Json(result))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;
    auth_service(&state).logout(&request.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Account>, ApiError> {
    let account = AccountRepository::new(state.pool.clone())
        .find_by_id(user_auth.account_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account is not active".to_string()))?;
    Ok(Json(account.into()))
}

/// PUT /api/v1/auth/me/password
///
/// Ends every other session and answers with a fresh token pair.
pub async fn change_password(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<AuthResult>, ApiError> {
    request.validate()?;
    let result = auth_service(&state)
        .change_password(
            user_auth.account_id,
            &request.current_password,
            &request.new_password,
        )
        .await?;
    Ok(Json(result))
}
