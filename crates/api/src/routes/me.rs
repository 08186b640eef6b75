//! The caller's own tenant settings.

use axum::{extract::State, Json};
use domain::models::account::{SetSubdomainRequest, SubdomainResponse};
use persistence::repositories::AccountRepository;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::tenant;

/// GET /api/v1/me/subdomain
pub async fn get_subdomain(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<SubdomainResponse>, ApiError> {
    let account = AccountRepository::new(state.pool.clone())
        .find_by_id(user_auth.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(SubdomainResponse {
        guest_url_preview: tenant::guest_url_preview(
            &state.config.tenancy,
            account.subdomain.as_deref(),
        ),
        subdomain: account.subdomain,
    }))
}

/// PUT /api/v1/me/subdomain
///
/// `{"subdomain": null}` clears the subdomain.
pub async fn set_subdomain(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<SetSubdomainRequest>,
) -> Result<Json<SubdomainResponse>, ApiError> {
    request.validate()?;
    let response = tenant::set_subdomain(
        &AccountRepository::new(state.pool.clone()),
        &state.config.tenancy,
        user_auth.account_id,
        request.subdomain.as_deref(),
    )
    .await?;
    Ok(Json(response))
}
