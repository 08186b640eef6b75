//! Account administration routes. Administrator only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::account::{CreateAccountRequest, UpdateAccountRequest};
use domain::models::Account;
use persistence::repositories::AccountRepository;
use serde::Deserialize;
use shared::pagination::{Page, PageRequest};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::accounts::{self, CreatedAccount};

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

fn account_not_found() -> ApiError {
    ApiError::NotFound("Account not found".to_string())
}

/// POST /api/v1/admin/accounts
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<CreatedAccount>), ApiError> {
    request.validate()?;
    let created = accounts::create_account(
        &AccountRepository::new(state.pool.clone()),
        &state.config.limits,
        &request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/admin/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Page<Account>>, ApiError> {
    let limits = &state.config.limits;
    let page = PageRequest::new(
        query.page,
        query.page_size,
        limits.default_page_size,
        limits.max_page_size,
    );

    let repo = AccountRepository::new(state.pool.clone());
    let (rows, total) = tokio::try_join!(repo.list(page.limit(), page.offset()), repo.count())?;

    Ok(Json(Page::new(rows, total, page).map(Account::from)))
}

/// GET /api/v1/admin/accounts/:account_id
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Account>, ApiError> {
    let account = AccountRepository::new(state.pool.clone())
        .find_by_id(account_id)
        .await?
        .ok_or_else(account_not_found)?;
    Ok(Json(account.into()))
}

/// PUT /api/v1/admin/accounts/:account_id
pub async fn update_account(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(account_id): Path<Uuid>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<Account>, ApiError> {
    request.validate()?;
    let account = accounts::update_account(
        &AccountRepository::new(state.pool.clone()),
        user_auth.account_id,
        account_id,
        &request,
    )
    .await?;
    Ok(Json(account))
}

/// DELETE /api/v1/admin/accounts/:account_id
///
/// Removes the account with its intros, guests, sections, images and albums.
pub async fn delete_account(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if account_id == user_auth.account_id {
        return Err(ApiError::Validation(
            "Administrators cannot delete their own account".to_string(),
        ));
    }

    let deleted = AccountRepository::new(state.pool.clone())
        .delete(account_id)
        .await?;
    if !deleted {
        return Err(account_not_found());
    }

    tracing::info!(
        account_id = %account_id,
        deleted_by = %user_auth.account_id,
        "Account deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
