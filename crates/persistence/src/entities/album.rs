//! Album entities (database row mappings).

use domain::models::{AlbumImage, AlbumSession};
use domain::services::Placement;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the album_sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct AlbumSessionEntity {
    pub id: Uuid,
    pub intro_id: Uuid,
    pub title: String,
    pub order: i32,
}

impl From<AlbumSessionEntity> for AlbumSession {
    fn from(entity: AlbumSessionEntity) -> Self {
        Self {
            id: entity.id,
            intro_id: entity.intro_id,
            title: entity.title,
            order: entity.order,
        }
    }
}

/// Album image joined with the URL of the session image it shows.
#[derive(Debug, Clone, FromRow)]
pub struct AlbumImageRow {
    pub id: Uuid,
    pub album_session_id: Uuid,
    pub session_image_id: Uuid,
    pub order: i32,
    pub url: String,
}

impl AlbumImageRow {
    pub fn placement(&self) -> Placement {
        Placement::new(self.id, self.order)
    }
}

impl From<AlbumImageRow> for AlbumImage {
    fn from(row: AlbumImageRow) -> Self {
        Self {
            id: row.id,
            album_session_id: row.album_session_id,
            session_image_id: row.session_image_id,
            order: row.order,
            url: row.url,
        }
    }
}
