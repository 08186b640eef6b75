//! Account repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::intro::CreateIntroRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AccountEntity, AccountRoleDb, AccountSessionEntity, IntroEntity};
use crate::metrics::QueryTimer;
use crate::repositories::intro::insert_intro_with_defaults;

/// Fields of a new account row.
#[derive(Debug, Clone, Copy)]
pub struct NewAccount<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: AccountRoleDb,
    pub max_invite: i32,
    pub subdomain: Option<&'a str>,
}

/// Partial account update; `None` leaves a column unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountChanges<'a> {
    pub role: Option<AccountRoleDb>,
    pub is_active: Option<bool>,
    pub max_invite: Option<i32>,
    pub password_hash: Option<&'a str>,
}

/// Repository for account and session operations.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_account_by_id");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, username, password_hash, role, is_active, max_invite, subdomain,
                   created_at, updated_at, last_login_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Usernames are matched case-insensitively.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_account_by_username");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, username, password_hash, role, is_active, max_invite, subdomain,
                   created_at, updated_at, last_login_at
            FROM accounts
            WHERE lower(username) = lower($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns true when an account other than `except` holds `subdomain`.
    pub async fn is_subdomain_taken(
        &self,
        subdomain: &str,
        except: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_subdomain_taken");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM accounts
                WHERE lower(subdomain) = lower($1) AND id <> $2
            )
            "#,
        )
        .bind(subdomain)
        .bind(except)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates an account, optionally with a default intro, in one transaction.
    pub async fn create(
        &self,
        account: NewAccount<'_>,
        provision: Option<&CreateIntroRequest>,
    ) -> Result<(AccountEntity, Option<IntroEntity>), sqlx::Error> {
        let timer = QueryTimer::new("create_account");
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, AccountEntity>(
            r#"
            INSERT INTO accounts (username, password_hash, role, max_invite, subdomain)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password_hash, role, is_active, max_invite, subdomain,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(account.username)
        .bind(account.password_hash)
        .bind(account.role)
        .bind(account.max_invite)
        .bind(account.subdomain)
        .fetch_one(&mut *tx)
        .await?;

        let intro = match provision {
            Some(names) => Some(insert_intro_with_defaults(&mut *tx, entity.id, names).await?),
            None => None,
        };

        tx.commit().await?;
        timer.record();
        Ok((entity, intro))
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: AccountChanges<'_>,
    ) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_account");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            UPDATE accounts
            SET role = COALESCE($2, role),
                is_active = COALESCE($3, is_active),
                max_invite = COALESCE($4, max_invite),
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, password_hash, role, is_active, max_invite, subdomain,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(changes.role)
        .bind(changes.is_active)
        .bind(changes.max_invite)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes an account and, through cascades, everything it owns.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_account");
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_accounts");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, username, password_hash, role, is_active, max_invite, subdomain,
                   created_at, updated_at, last_login_at
            FROM accounts
            ORDER BY created_at, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_accounts");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Assigns or clears the subdomain.
    ///
    /// Uniqueness is enforced by the index on `lower(subdomain)`; a lost race
    /// surfaces as a unique violation.
    pub async fn set_subdomain(
        &self,
        id: Uuid,
        subdomain: Option<&str>,
    ) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_account_subdomain");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            UPDATE accounts
            SET subdomain = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, password_hash, role, is_active, max_invite, subdomain,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(subdomain)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_last_login(
        &self,
        id: Uuid,
        last_login_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_account_last_login");
        sqlx::query("UPDATE accounts SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(last_login_at)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_account_password");
        sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    // Sessions

    pub async fn create_session(
        &self,
        account_id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AccountSessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_account_session");
        let result = sqlx::query_as::<_, AccountSessionEntity>(
            r#"
            INSERT INTO account_sessions (account_id, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, account_id, refresh_token_hash, expires_at, created_at, last_used_at
            "#,
        )
        .bind(account_id)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Swaps a live session's refresh token hash for a new one.
    ///
    /// Returns `None` when the old hash is unknown or expired, so a token can
    /// be rotated at most once.
    pub async fn rotate_session(
        &self,
        old_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<AccountSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("rotate_account_session");
        let result = sqlx::query_as::<_, AccountSessionEntity>(
            r#"
            UPDATE account_sessions
            SET refresh_token_hash = $2, expires_at = $3, last_used_at = NOW()
            WHERE refresh_token_hash = $1 AND expires_at > NOW()
            RETURNING id, account_id, refresh_token_hash, expires_at, created_at, last_used_at
            "#,
        )
        .bind(old_hash)
        .bind(new_hash)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_session(&self, refresh_token_hash: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_account_session");
        let result = sqlx::query("DELETE FROM account_sessions WHERE refresh_token_hash = $1")
            .bind(refresh_token_hash)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Deletes all sessions of an account.
    pub async fn delete_all_sessions(&self, account_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_all_account_sessions");
        let result = sqlx::query("DELETE FROM account_sessions WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    pub async fn prune_expired_sessions(&self, account_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("prune_expired_account_sessions");
        let result = sqlx::query(
            "DELETE FROM account_sessions WHERE account_id = $1 AND expires_at <= NOW()",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
