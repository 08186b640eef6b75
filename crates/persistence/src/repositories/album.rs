//! Album repository: sessions and their images.
//!
//! Every write that changes positions locks the owning row first (the intro
//! for sessions, the session for images) and leaves orders as 1..N. The
//! unique order constraints are deferred, so shifts and permutations can be
//! written in any row order before commit.

use domain::services::ordering::{self, OrderingError, Placement};
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{AlbumImageRow, AlbumSessionEntity};
use crate::metrics::QueryTimer;

#[derive(Debug, Error)]
pub enum AlbumError {
    #[error("Album session not found")]
    SessionNotFound,

    #[error("Album image not found")]
    ImageNotFound,

    #[error("Session image not found in this invitation")]
    SessionImageNotFound,

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct AlbumRepository {
    pool: PgPool,
}

impl AlbumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Sessions

    pub async fn list_sessions(&self, intro_id: Uuid) -> Result<Vec<AlbumSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_album_sessions");
        let result = sqlx::query_as::<_, AlbumSessionEntity>(
            r#"
            SELECT id, intro_id, title, "order"
            FROM album_sessions
            WHERE intro_id = $1
            ORDER BY "order", id
            "#,
        )
        .bind(intro_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_session(
        &self,
        id: Uuid,
        intro_id: Uuid,
    ) -> Result<Option<AlbumSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_album_session");
        let result = sqlx::query_as::<_, AlbumSessionEntity>(
            r#"
            SELECT id, intro_id, title, "order"
            FROM album_sessions
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

    /// Appends a session at the end of the intro's albums.
    pub async fn create_session(
        &self,
        intro_id: Uuid,
        title: &str,
    ) -> Result<AlbumSessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_album_session");
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM intros WHERE id = $1 FOR UPDATE")
            .bind(intro_id)
            .fetch_one(&mut *tx)
            .await?;

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM album_sessions WHERE intro_id = $1")
            .bind(intro_id)
            .fetch_one(&mut *tx)
            .await?;

        let session = sqlx::query_as::<_, AlbumSessionEntity>(
            r#"
            INSERT INTO album_sessions (intro_id, title, "order")
            VALUES ($1, $2, $3)
            RETURNING id, intro_id, title, "order"
            "#,
        )
        .bind(intro_id)
        .bind(title)
        .bind(ordering::append_position(usize::try_from(count).unwrap_or(0)))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(session)
    }

    pub async fn update_session_title(
        &self,
        id: Uuid,
        intro_id: Uuid,
        title: &str,
    ) -> Result<Option<AlbumSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_album_session");
        let result = sqlx::query_as::<_, AlbumSessionEntity>(
            r#"
            UPDATE album_sessions
            SET title = $3
            WHERE id = $1 AND intro_id = $2
            RETURNING id, intro_id, title, "order"
            "#,
        )
        .bind(id)
        .bind(intro_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes a session with its images and closes the gap it leaves.
    pub async fn delete_session(&self, id: Uuid, intro_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_album_session");
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM intros WHERE id = $1 FOR UPDATE")
            .bind(intro_id)
            .fetch_optional(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM album_sessions WHERE id = $1 AND intro_id = $2")
            .bind(id)
            .bind(intro_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE album_sessions AS s
            SET "order" = r.position
            FROM (
                SELECT id, ROW_NUMBER() OVER (ORDER BY "order", id) AS position
                FROM album_sessions
                WHERE intro_id = $1
            ) r
            WHERE s.id = r.id AND s."order" <> r.position
            "#,
        )
        .bind(intro_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(true)
    }

    // Images

    /// All album images of an intro, grouped by session and sorted by order.
    pub async fn list_images_for_intro(&self, intro_id: Uuid) -> Result<Vec<AlbumImageRow>, sqlx::Error> {
        let timer = QueryTimer::new("list_album_images_for_intro");
        let result = sqlx::query_as::<_, AlbumImageRow>(
            r#"
            SELECT ai.id, ai.album_session_id, ai.session_image_id, ai."order", si.url
            FROM album_images ai
            JOIN session_images si ON si.id = ai.session_image_id
            WHERE ai.intro_id = $1
            ORDER BY ai.album_session_id, ai."order", ai.id
            "#,
        )
        .bind(intro_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_images(&self, session_id: Uuid) -> Result<Vec<AlbumImageRow>, sqlx::Error> {
        let timer = QueryTimer::new("list_album_images");
        let result = list_images_on(&self.pool, session_id).await;
        timer.record();
        result
    }

    /// Adds a session image to an album, appending or inserting at `position`.
    pub async fn add_image(
        &self,
        session_id: Uuid,
        intro_id: Uuid,
        session_image_id: Uuid,
        position: Option<i32>,
    ) -> Result<Vec<AlbumImageRow>, AlbumError> {
        let timer = QueryTimer::new("add_album_image");
        let mut tx = self.pool.begin().await?;
        lock_session(&mut *tx, session_id, intro_id).await?;

        let image_in_intro = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM session_images WHERE id = $1 AND intro_id = $2)",
        )
        .bind(session_image_id)
        .bind(intro_id)
        .fetch_one(&mut *tx)
        .await?;

        if !image_in_intro {
            return Err(AlbumError::SessionImageNotFound);
        }

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM album_images WHERE album_session_id = $1",
        )
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;
        let len = usize::try_from(count).unwrap_or(0);

        let order = match position {
            Some(requested) => ordering::insert_position(requested, len)?,
            None => ordering::append_position(len),
        };

        sqlx::query(
            r#"
            UPDATE album_images
            SET "order" = "order" + 1
            WHERE album_session_id = $1 AND "order" >= $2
            "#,
        )
        .bind(session_id)
        .bind(order)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO album_images (album_session_id, intro_id, session_image_id, "order")
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session_id)
        .bind(intro_id)
        .bind(session_image_id)
        .bind(order)
        .execute(&mut *tx)
        .await?;

        let images = list_images_on(&mut *tx, session_id).await?;
        tx.commit().await?;
        timer.record();
        Ok(images)
    }

    /// Removes an image from an album and renumbers the rest.
    pub async fn remove_image(
        &self,
        session_id: Uuid,
        intro_id: Uuid,
        album_image_id: Uuid,
    ) -> Result<Vec<AlbumImageRow>, AlbumError> {
        let timer = QueryTimer::new("remove_album_image");
        let mut tx = self.pool.begin().await?;
        lock_session(&mut *tx, session_id, intro_id).await?;

        let deleted = sqlx::query("DELETE FROM album_images WHERE id = $1 AND album_session_id = $2")
            .bind(album_image_id)
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AlbumError::ImageNotFound);
        }

        sqlx::query(
            r#"
            UPDATE album_images AS ai
            SET "order" = r.position
            FROM (
                SELECT id, ROW_NUMBER() OVER (ORDER BY "order", id) AS position
                FROM album_images
                WHERE album_session_id = $1
            ) r
            WHERE ai.id = r.id AND ai."order" <> r.position
            "#,
        )
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        let images = list_images_on(&mut *tx, session_id).await?;
        tx.commit().await?;
        timer.record();
        Ok(images)
    }

    /// Applies a reorder request and returns the renumbered images.
    pub async fn reorder_images(
        &self,
        session_id: Uuid,
        intro_id: Uuid,
        requested: &[Placement],
    ) -> Result<Vec<AlbumImageRow>, AlbumError> {
        let timer = QueryTimer::new("reorder_album_images");
        let mut tx = self.pool.begin().await?;
        lock_session(&mut *tx, session_id, intro_id).await?;

        let current: Vec<Placement> = list_images_on(&mut *tx, session_id)
            .await?
            .iter()
            .map(AlbumImageRow::placement)
            .collect();

        let plan = ordering::plan_reorder(&current, requested)?;
        let (ids, orders): (Vec<Uuid>, Vec<i32>) = plan.iter().map(|p| (p.id, p.order)).unzip();

        sqlx::query(
            r#"
            UPDATE album_images AS ai
            SET "order" = v.position
            FROM UNNEST($1::uuid[], $2::int4[]) AS v(id, position)
            WHERE ai.id = v.id AND ai.album_session_id = $3 AND ai."order" <> v.position
            "#,
        )
        .bind(&ids)
        .bind(&orders)
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        let images = list_images_on(&mut *tx, session_id).await?;
        tx.commit().await?;
        timer.record();
        Ok(images)
    }
}

async fn lock_session(
    conn: &mut PgConnection,
    session_id: Uuid,
    intro_id: Uuid,
) -> Result<(), AlbumError> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM album_sessions WHERE id = $1 AND intro_id = $2 FOR UPDATE",
    )
    .bind(session_id)
    .bind(intro_id)
    .fetch_optional(conn)
    .await?
    .map(|_| ())
    .ok_or(AlbumError::SessionNotFound)
}

async fn list_images_on<'e, E>(executor: E, session_id: Uuid) -> Result<Vec<AlbumImageRow>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, AlbumImageRow>(
        r#"
        SELECT ai.id, ai.album_session_id, ai.session_image_id, ai."order", si.url
        FROM album_images ai
        JOIN session_images si ON si.id = ai.session_image_id
        WHERE ai.album_session_id = $1
        ORDER BY ai."order", ai.id
        "#,
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}
