//! Account administration rules shared by the admin routes.

use domain::models::account::{CreateAccountRequest, UpdateAccountRequest};
use domain::models::intro::CreateIntroRequest;
use domain::models::{Account, AccountRole, Intro};
use persistence::entities::AccountRoleDb;
use persistence::repositories::{AccountChanges, AccountRepository, NewAccount};
use shared::password::{check_password_policy, hash_password};
use uuid::Uuid;

use crate::config::LimitsConfig;
use crate::error::ApiError;
use crate::middleware::metrics::record_subdomain_conflict;
use crate::services::tenant::check_candidate;

/// A created account and the intro provisioned with it, if requested.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CreatedAccount {
    pub account: Account,
    pub intro: Option<Intro>,
}

pub async fn create_account(
    accounts: &AccountRepository,
    limits: &LimitsConfig,
    request: &CreateAccountRequest,
) -> Result<CreatedAccount, ApiError> {
    check_password_policy(&request.password)?;

    let max_invite = request.max_invite.unwrap_or(limits.default_max_invite);
    let provision = request.provision_intro.unwrap_or(false);
    if provision && max_invite < 1 {
        return Err(ApiError::Validation(
            "Cannot provision an intro for an account with max_invite 0".to_string(),
        ));
    }

    let subdomain = match request.subdomain.as_deref() {
        Some(raw) => {
            let subdomain = check_candidate(raw)?;
            if accounts.is_subdomain_taken(&subdomain, Uuid::nil()).await? {
                record_subdomain_conflict("taken");
                return Err(ApiError::Conflict("Subdomain is already taken".to_string()));
            }
            Some(subdomain)
        }
        None => None,
    };

    let password_hash = hash_password(&request.password)?;
    let role = request.role.unwrap_or(AccountRole::Owner);
    let defaults = CreateIntroRequest::default();

    let (account, intro) = accounts
        .create(
            NewAccount {
                username: request.username.trim(),
                password_hash: &password_hash,
                role: role.into(),
                max_invite,
                subdomain: subdomain.as_deref(),
            },
            provision.then_some(&defaults),
        )
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                ApiError::Conflict("Username or subdomain already exists".to_string())
            }
            other => other,
        })?;

    tracing::info!(
        account_id = %account.id,
        username = %account.username,
        role = %role,
        provisioned = intro.is_some(),
        "Account created"
    );

    Ok(CreatedAccount {
        account: account.into(),
        intro: intro.map(Into::into),
    })
}

/// Rejects changes an administrator may not make to their own account.
pub fn check_self_update(
    acting_admin: Uuid,
    target: Uuid,
    request: &UpdateAccountRequest,
) -> Result<(), ApiError> {
    if acting_admin != target {
        return Ok(());
    }
    if request.is_active == Some(false) {
        return Err(ApiError::Validation(
            "Administrators cannot deactivate their own account".to_string(),
        ));
    }
    if matches!(request.role, Some(role) if !role.is_administrator()) {
        return Err(ApiError::Validation(
            "Administrators cannot remove their own administrator role".to_string(),
        ));
    }
    Ok(())
}

pub async fn update_account(
    accounts: &AccountRepository,
    acting_admin: Uuid,
    id: Uuid,
    request: &UpdateAccountRequest,
) -> Result<Account, ApiError> {
    check_self_update(acting_admin, id, request)?;

    let password_hash = match request.password.as_deref() {
        Some(password) => {
            check_password_policy(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let updated = accounts
        .update(
            id,
            AccountChanges {
                role: request.role.map(AccountRoleDb::from),
                is_active: request.is_active,
                max_invite: request.max_invite,
                password_hash: password_hash.as_deref(),
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    // Deactivation and password resets end every open session.
    if request.is_active == Some(false) || password_hash.is_some() {
        accounts.delete_all_sessions(id).await?;
    }

    tracing::info!(account_id = %id, "Account updated");
    Ok(updated.into())
}
