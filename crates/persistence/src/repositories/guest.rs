//! Guest repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GuestConfirmationRow, GuestEntity, GuestStatsRow};
use crate::metrics::QueryTimer;

/// Outcome of a guest deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteGuestOutcome {
    Deleted,
    NotFound,
    /// The guest is the intro's seed guest and stays.
    SeedProtected,
}

/// Owner edit of a guest; `None` leaves a column unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuestChanges<'a> {
    pub name: Option<&'a str>,
    pub user_relationship: Option<&'a str>,
    pub confirmed: Option<bool>,
}

/// Repository for guest operations.
#[derive(Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

impl GuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a guest with a fresh random id.
    pub async fn create(
        &self,
        intro_id: Uuid,
        name: &str,
        user_relationship: &str,
    ) -> Result<GuestEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_guest");
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            INSERT INTO guests (id, intro_id, name, user_relationship)
            VALUES ($1, $2, $3, $4)
            RETURNING id, intro_id, name, user_relationship, confirmed, confirmed_at, is_seed,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(intro_id)
        .bind(name)
        .bind(user_relationship)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_guest_by_id");
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            SELECT id, intro_id, name, user_relationship, confirmed, confirmed_at, is_seed,
                   created_at, updated_at
            FROM guests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A guest, only if it belongs to `intro_id`.
    pub async fn find_in_intro(
        &self,
        id: Uuid,
        intro_id: Uuid,
    ) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_guest_in_intro");
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            SELECT id, intro_id, name, user_relationship, confirmed, confirmed_at, is_seed,
                   created_at, updated_at
            FROM guests
            WHERE id = $1 AND intro_id = $2
            "#,
        )
        .bind(id)
        .bind(intro_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_seed(&self, intro_id: Uuid) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_seed_guest");
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            SELECT id, intro_id, name, user_relationship, confirmed, confirmed_at, is_seed,
                   created_at, updated_at
            FROM guests
            WHERE intro_id = $1 AND is_seed
            "#,
        )
        .bind(intro_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Guests of an intro, oldest first, optionally filtered by confirmation.
    pub async fn list(
        &self,
        intro_id: Uuid,
        confirmed: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_guests");
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            SELECT id, intro_id, name, user_relationship, confirmed, confirmed_at, is_seed,
                   created_at, updated_at
            FROM guests
            WHERE intro_id = $1 AND ($2::boolean IS NULL OR confirmed = $2)
            ORDER BY created_at, id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(intro_id)
        .bind(confirmed)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count(&self, intro_id: Uuid, confirmed: Option<bool>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_guests");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM guests
            WHERE intro_id = $1 AND ($2::boolean IS NULL OR confirmed = $2)
            "#,
        )
        .bind(intro_id)
        .bind(confirmed)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Owner edit. Setting `confirmed` to false clears the confirmation time;
    /// setting it to true keeps an existing one.
    pub async fn update(
        &self,
        id: Uuid,
        intro_id: Uuid,
        changes: GuestChanges<'_>,
    ) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_guest");
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            UPDATE guests
            SET name = COALESCE($3, name),
                user_relationship = COALESCE($4, user_relationship),
                confirmed = COALESCE($5, confirmed),
                confirmed_at = CASE
                    WHEN $5::boolean IS NULL THEN confirmed_at
                    WHEN $5 THEN COALESCE(confirmed_at, NOW())
                    ELSE NULL
                END,
                updated_at = NOW()
            WHERE id = $1 AND intro_id = $2
            RETURNING id, intro_id, name, user_relationship, confirmed, confirmed_at, is_seed,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(intro_id)
        .bind(changes.name)
        .bind(changes.user_relationship)
        .bind(changes.confirmed)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Marks a guest as attending.
    ///
    /// A single statement: the conditional update only touches an unconfirmed
    /// row, and the second branch reports an already confirmed one. No row
    /// means the guest does not exist (or is outside `intro_id` when given).
    pub async fn confirm(
        &self,
        id: Uuid,
        intro_id: Option<Uuid>,
    ) -> Result<Option<GuestConfirmationRow>, sqlx::Error> {
        let timer = QueryTimer::new("confirm_guest");
        let result = sqlx::query_as::<_, GuestConfirmationRow>(
            r#"
            WITH updated AS (
                UPDATE guests
                SET confirmed = true, confirmed_at = NOW(), updated_at = NOW()
                WHERE id = $1
                  AND ($2::uuid IS NULL OR intro_id = $2)
                  AND NOT confirmed
                RETURNING id, intro_id, name, user_relationship, confirmed, confirmed_at,
                          is_seed, created_at, updated_at
            )
            SELECT id, intro_id, name, user_relationship, confirmed, confirmed_at, is_seed,
                   created_at, updated_at, false AS already_confirmed
            FROM updated
            UNION ALL
            SELECT id, intro_id, name, user_relationship, confirmed, confirmed_at, is_seed,
                   created_at, updated_at, true AS already_confirmed
            FROM guests
            WHERE id = $1
              AND ($2::uuid IS NULL OR intro_id = $2)
              AND NOT EXISTS (SELECT 1 FROM updated)
            "#,
        )
        .bind(id)
        .bind(intro_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes a guest unless it is the seed guest.
    pub async fn delete(&self, id: Uuid, intro_id: Uuid) -> Result<DeleteGuestOutcome, sqlx::Error> {
        let timer = QueryTimer::new("delete_guest");
        let deleted = sqlx::query("DELETE FROM guests WHERE id = $1 AND intro_id = $2 AND NOT is_seed")
            .bind(id)
            .bind(intro_id)
            .execute(&self.pool)
            .await?;

        let outcome = if deleted.rows_affected() > 0 {
            DeleteGuestOutcome::Deleted
        } else {
            let is_seed = sqlx::query_scalar::<_, bool>(
                "SELECT is_seed FROM guests WHERE id = $1 AND intro_id = $2",
            )
            .bind(id)
            .bind(intro_id)
            .fetch_optional(&self.pool)
            .await?;
            match is_seed {
                Some(true) => DeleteGuestOutcome::SeedProtected,
                _ => DeleteGuestOutcome::NotFound,
            }
        };
        timer.record();
        Ok(outcome)
    }

    /// Guest counts plus the owning account's quota.
    pub async fn stats(&self, intro_id: Uuid) -> Result<Option<GuestStatsRow>, sqlx::Error> {
        let timer = QueryTimer::new("guest_stats");
        let result = sqlx::query_as::<_, GuestStatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM guests g WHERE g.intro_id = i.id) AS total,
                (SELECT COUNT(*) FROM guests g WHERE g.intro_id = i.id AND g.confirmed) AS confirmed,
                a.max_invite AS max_allowed
            FROM intros i
            JOIN accounts a ON a.id = i.account_id
            WHERE i.id = $1
            "#,
        )
        .bind(intro_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
