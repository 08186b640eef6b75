//! Intro repository for database operations.

use domain::models::guest::{SEED_GUEST_NAME, SEED_GUEST_RELATIONSHIP};
use domain::models::intro::{CreateIntroRequest, UpdateIntroRequest};
use domain::models::section::{
    DEFAULT_ATTENDANCE_REQUEST_TEXT, DEFAULT_CLOSING_MESSAGE, DEFAULT_GREETING_TEXT,
    DEFAULT_THANK_YOU_TEXT,
};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::IntroEntity;
use crate::metrics::QueryTimer;

/// Outcome of a quota-checked intro creation.
#[derive(Debug)]
pub enum CreateIntroOutcome {
    Created(IntroEntity),
    QuotaReached { max_invite: i32 },
    AccountNotFound,
}

/// Inserts an intro with its default sections and seed guest.
///
/// Runs on the caller's connection so it joins the caller's transaction.
pub(crate) async fn insert_intro_with_defaults(
    conn: &mut PgConnection,
    account_id: Uuid,
    names: &CreateIntroRequest,
) -> Result<IntroEntity, sqlx::Error> {
    let intro = sqlx::query_as::<_, IntroEntity>(
        r#"
        INSERT INTO intros (account_id, groom_name, groom_full_name, bride_name, bride_full_name)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, account_id, groom_name, groom_full_name, bride_name, bride_full_name,
                  created_at, updated_at
        "#,
    )
    .bind(account_id)
    .bind(names.groom_name.trim())
    .bind(names.groom_full_name.trim())
    .bind(names.bride_name.trim())
    .bind(names.bride_full_name.trim())
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query("INSERT INTO header_sections (intro_id) VALUES ($1)")
        .bind(intro.id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO invite_sections (intro_id, greeting_text, attendance_request_text)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(intro.id)
    .bind(DEFAULT_GREETING_TEXT)
    .bind(DEFAULT_ATTENDANCE_REQUEST_TEXT)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO footer_sections (intro_id, thank_you_text, closing_message)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(intro.id)
    .bind(DEFAULT_THANK_YOU_TEXT)
    .bind(DEFAULT_CLOSING_MESSAGE)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO guests (id, intro_id, name, user_relationship, is_seed)
        VALUES ($1, $2, $3, $4, true)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(intro.id)
    .bind(SEED_GUEST_NAME)
    .bind(SEED_GUEST_RELATIONSHIP)
    .execute(&mut *conn)
    .await?;

    Ok(intro)
}

/// Repository for intro operations.
#[derive(Clone)]
pub struct IntroRepository {
    pool: PgPool,
}

impl IntroRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an intro unless the account has reached its `max_invite` quota.
    ///
    /// The account row is locked for the duration, so concurrent creations for
    /// one account are serialized and cannot overshoot the quota.
    pub async fn create_checked(
        &self,
        account_id: Uuid,
        names: &CreateIntroRequest,
    ) -> Result<CreateIntroOutcome, sqlx::Error> {
        let timer = QueryTimer::new("create_intro");
        let mut tx = self.pool.begin().await?;

        let max_invite = sqlx::query_scalar::<_, i32>(
            "SELECT max_invite FROM accounts WHERE id = $1 FOR UPDATE",
        )
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(max_invite) = max_invite else {
            return Ok(CreateIntroOutcome::AccountNotFound);
        };

        let owned = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM intros WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(&mut *tx)
            .await?;

        if owned >= i64::from(max_invite) {
            return Ok(CreateIntroOutcome::QuotaReached { max_invite });
        }

        let intro = insert_intro_with_defaults(&mut *tx, account_id, names).await?;
        tx.commit().await?;
        timer.record();
        Ok(CreateIntroOutcome::Created(intro))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<IntroEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_intro_by_id");
        let result = sqlx::query_as::<_, IntroEntity>(
            r#"
            SELECT id, account_id, groom_name, groom_full_name, bride_name, bride_full_name,
                   created_at, updated_at
            FROM intros
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Owning account of an intro, for authorization.
    pub async fn owner_of(&self, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("find_intro_owner");
        let result = sqlx::query_scalar::<_, Uuid>("SELECT account_id FROM intros WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Oldest intro of an account, the one its subdomain serves.
    pub async fn first_of_account(&self, account_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("find_first_intro_of_account");
        let result = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM intros WHERE account_id = $1 ORDER BY created_at, id LIMIT 1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Intros of an account, oldest first.
    pub async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<IntroEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_intros_by_account");
        let result = sqlx::query_as::<_, IntroEntity>(
            r#"
            SELECT id, account_id, groom_name, groom_full_name, bride_name, bride_full_name,
                   created_at, updated_at
            FROM intros
            WHERE account_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// First intro of the active account holding `subdomain`.
    pub async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<IntroEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_intro_by_subdomain");
        let result = sqlx::query_as::<_, IntroEntity>(
            r#"
            SELECT i.id, i.account_id, i.groom_name, i.groom_full_name, i.bride_name,
                   i.bride_full_name, i.created_at, i.updated_at
            FROM intros i
            JOIN accounts a ON a.id = i.account_id
            WHERE lower(a.subdomain) = lower($1) AND a.is_active
            ORDER BY i.created_at, i.id
            LIMIT 1
            "#,
        )
        .bind(subdomain)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// An intro whose owning account is active.
    pub async fn find_public(&self, id: Uuid) -> Result<Option<IntroEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_public_intro");
        let result = sqlx::query_as::<_, IntroEntity>(
            r#"
            SELECT i.id, i.account_id, i.groom_name, i.groom_full_name, i.bride_name,
                   i.bride_full_name, i.created_at, i.updated_at
            FROM intros i
            JOIN accounts a ON a.id = i.account_id
            WHERE i.id = $1 AND a.is_active
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: &UpdateIntroRequest,
    ) -> Result<Option<IntroEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_intro");
        let result = sqlx::query_as::<_, IntroEntity>(
            r#"
            UPDATE intros
            SET groom_name = COALESCE($2, groom_name),
                groom_full_name = COALESCE($3, groom_full_name),
                bride_name = COALESCE($4, bride_name),
                bride_full_name = COALESCE($5, bride_full_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, account_id, groom_name, groom_full_name, bride_name, bride_full_name,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.groom_name.as_deref().map(str::trim))
        .bind(changes.groom_full_name.as_deref().map(str::trim))
        .bind(changes.bride_name.as_deref().map(str::trim))
        .bind(changes.bride_full_name.as_deref().map(str::trim))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes an intro; sections, images, albums and guests cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_intro");
        let result = sqlx::query("DELETE FROM intros WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
