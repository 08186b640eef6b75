//! First administrator, created at start-up from configuration.
//!
//! Runs after migrations. Idempotent: an existing account with the bootstrap
//! username is left untouched.

use persistence::entities::AccountRoleDb;
use persistence::repositories::{AccountRepository, NewAccount};
use shared::password::{check_password_policy, hash_password, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// What the bootstrap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AlreadyExists,
    Created,
}

/// Creates the bootstrap administrator if configured and missing.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
    max_invite: i32,
) -> Result<BootstrapOutcome, BootstrapError> {
    let username = config.bootstrap_username.trim();

    if !config.is_configured() {
        if !username.is_empty() {
            warn!(
                "WI__ADMIN__BOOTSTRAP_USERNAME is set but WI__ADMIN__BOOTSTRAP_PASSWORD is empty - skipping bootstrap"
            );
        }
        return Ok(BootstrapOutcome::NotConfigured);
    }

    let accounts = AccountRepository::new(pool.clone());

    if let Some(existing) = accounts.find_by_username(username).await? {
        if existing.role != AccountRoleDb::Administrator {
            warn!(
                username = %username,
                "Bootstrap username belongs to a non-administrator account - left unchanged"
            );
        } else {
            info!(username = %username, "Bootstrap administrator already exists");
        }
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    check_password_policy(&config.bootstrap_password).map_err(|e| match e {
        PasswordError::Policy(msg) => BootstrapError::Config(format!("Bootstrap password: {}", msg)),
        other => other.into(),
    })?;
    let password_hash = hash_password(&config.bootstrap_password)?;

    let created = accounts
        .create(
            NewAccount {
                username,
                password_hash: &password_hash,
                role: AccountRoleDb::Administrator,
                max_invite,
                subdomain: None,
            },
            None,
        )
        .await;

    let (account, _) = match created {
        Ok(created) => created,
        // Another instance won the race for the same username.
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
            info!(username = %username, "Bootstrap administrator created concurrently");
            return Ok(BootstrapOutcome::AlreadyExists);
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        username = %username,
        account_id = %account.id,
        "Bootstrap administrator created"
    );
    warn!(
        "SECURITY: Remove WI__ADMIN__BOOTSTRAP_USERNAME and WI__ADMIN__BOOTSTRAP_PASSWORD \
         from configuration after initial setup"
    );

    Ok(BootstrapOutcome::Created)
}
