//! Authentication service: login, refresh rotation, logout and password change.

use chrono::{Duration, Utc};
use domain::models::{Account, AccountRole};
use persistence::entities::AccountEntity;
use persistence::repositories::AccountRepository;
use serde::Serialize;
use shared::crypto::session_fingerprint;
use shared::jwt::{extract_account_id, JwtConfig, JwtError};
use shared::password::{check_password_policy, hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::metrics::record_login;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::InvalidRefreshToken
            | AuthError::AccountNotFound => ApiError::Unauthorized(err.to_string()),
            AuthError::WrongCurrentPassword => ApiError::Validation(err.to_string()),
            AuthError::Token(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::Password(e) => e.into(),
            AuthError::Database(e) => e.into(),
        }
    }
}

/// Access and refresh tokens handed to a client.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Result of a successful authentication.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub account: Account,
}

/// Tokens issued for one session, with the fingerprint of the refresh token.
struct IssuedPair {
    tokens: TokenPair,
    session_hash: String,
}

/// Authentication service.
pub struct AuthService {
    accounts: AccountRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            jwt,
        }
    }

    /// Login with username and password.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResult, AuthError> {
        let Some(account) = self.accounts.find_by_username(username.trim()).await? else {
            record_login("invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &account.password_hash)? {
            record_login("invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_active {
            record_login("disabled");
            return Err(AuthError::AccountDisabled);
        }

        let now = Utc::now();
        self.accounts.update_last_login(account.id, now).await?;
        self.accounts.prune_expired_sessions(account.id).await?;

        let issued = self.issue(&account)?;
        self.accounts
            .create_session(account.id, &issued.session_hash, self.refresh_expiry_from_now())
            .await?;

        record_login("success");
        tracing::info!(account_id = %account.id, "Account logged in");

        let mut account: Account = account.into();
        account.last_login_at = Some(now);
        Ok(AuthResult {
            tokens: issued.tokens,
            account,
        })
    }

    /// Exchanges a refresh token for a new pair, rotating the session.
    ///
    /// The presented refresh token stops working once this returns.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResult, AuthError> {
        let claims = self.jwt.validate_refresh_token(refresh_token).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token rejected");
            AuthError::InvalidRefreshToken
        })?;
        let account_id =
            extract_account_id(&claims).map_err(|_| AuthError::InvalidRefreshToken)?;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(AuthError::InvalidRefreshToken)?;

        let issued = self.issue(&account)?;
        let session = self
            .accounts
            .rotate_session(
                &session_fingerprint(&claims.jti),
                &issued.session_hash,
                self.refresh_expiry_from_now(),
            )
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if session.account_id != account.id {
            tracing::warn!(
                session_account = %session.account_id,
                token_account = %account.id,
                "Refresh token subject does not match its session"
            );
            self.accounts.delete_session(&issued.session_hash).await?;
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok(AuthResult {
            tokens: issued.tokens,
            account: account.into(),
        })
    }

    /// Ends the session of a refresh token. Unknown or expired tokens are a no-op.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let Ok(claims) = self.jwt.validate_refresh_token(refresh_token) else {
            return Ok(());
        };

        let removed = self
            .accounts
            .delete_session(&session_fingerprint(&claims.jti))
            .await?;
        if removed {
            tracing::info!(account_id = %claims.sub, "Session ended");
        }
        Ok(())
    }

    /// Changes the password and replaces every session with a fresh one.
    pub async fn change_password(
        &self,
        account_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<AuthResult, AuthError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !verify_password(current_password, &account.password_hash)? {
            return Err(AuthError::WrongCurrentPassword);
        }

        check_password_policy(new_password)?;
        let password_hash = hash_password(new_password)?;

        self.accounts.update_password(account.id, &password_hash).await?;
        let revoked = self.accounts.delete_all_sessions(account.id).await?;

        let issued = self.issue(&account)?;
        self.accounts
            .create_session(account.id, &issued.session_hash, self.refresh_expiry_from_now())
            .await?;

        tracing::info!(account_id = %account.id, revoked_sessions = revoked, "Password changed");

        Ok(AuthResult {
            tokens: issued.tokens,
            account: account.into(),
        })
    }

    fn issue(&self, account: &AccountEntity) -> Result<IssuedPair, AuthError> {
        let role = AccountRole::from(account.role);
        let access = self.jwt.generate_access_token(account.id, role.as_str())?;
        let refresh = self.jwt.generate_refresh_token(account.id, role.as_str())?;

        Ok(IssuedPair {
            session_hash: session_fingerprint(&refresh.jti),
            tokens: TokenPair {
                access_token: access.token,
                refresh_token: refresh.token,
                token_type: "Bearer",
                expires_in: access.expires_in,
            },
        })
    }

    fn refresh_expiry_from_now(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::seconds(self.jwt.refresh_token_expiry_secs)
    }
}
