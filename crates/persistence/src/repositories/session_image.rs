//! Session image repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SessionImageEntity;
use crate::metrics::QueryTimer;

/// Outcome of a session image deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteImageOutcome {
    Deleted,
    NotFound,
    /// A section or album image still points at it.
    StillReferenced,
}

#[derive(Clone)]
pub struct SessionImageRepository {
    pool: PgPool,
}

impl SessionImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, intro_id: Uuid, url: &str) -> Result<SessionImageEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_session_image");
        let result = sqlx::query_as::<_, SessionImageEntity>(
            r#"
            INSERT INTO session_images (intro_id, url)
            VALUES ($1, $2)
            RETURNING id, intro_id, url, created_at
            "#,
        )
        .bind(intro_id)
        .bind(url)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list(&self, intro_id: Uuid) -> Result<Vec<SessionImageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_session_images");
        let result = sqlx::query_as::<_, SessionImageEntity>(
            r#"
            SELECT id, intro_id, url, created_at
            FROM session_images
            WHERE intro_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(intro_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// How many of `ids` are images of `intro_id`.
    pub async fn count_owned(&self, intro_id: Uuid, ids: &[Uuid]) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_owned_session_images");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM session_images
            WHERE intro_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(intro_id)
        .bind(ids)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes an image that nothing references any more.
    ///
    /// The image row is locked first so a concurrent section write cannot add
    /// a reference between the check and the delete.
    pub async fn delete(&self, id: Uuid, intro_id: Uuid) -> Result<DeleteImageOutcome, sqlx::Error> {
        let timer = QueryTimer::new("delete_session_image");
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM session_images WHERE id = $1 AND intro_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(intro_id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Ok(DeleteImageOutcome::NotFound);
        }

        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM header_sections WHERE session_image_id = $1)
                OR EXISTS (
                    SELECT 1 FROM family_sections
                    WHERE $1 IN (session_image_id, groom_image_id, bride_image_id)
                )
                OR EXISTS (
                    SELECT 1 FROM invite_sections
                    WHERE $1 IN (left_image_id, center_image_id, right_image_id)
                )
                OR EXISTS (SELECT 1 FROM footer_sections WHERE session_image_id = $1)
                OR EXISTS (SELECT 1 FROM album_images WHERE session_image_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if referenced {
            return Ok(DeleteImageOutcome::StillReferenced);
        }

        sqlx::query("DELETE FROM session_images WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(DeleteImageOutcome::Deleted)
    }
}
