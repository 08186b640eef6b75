//! Session image entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::SessionImage;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct SessionImageEntity {
    pub id: Uuid,
    pub intro_id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl From<SessionImageEntity> for SessionImage {
    fn from(entity: SessionImageEntity) -> Self {
        Self {
            id: entity.id,
            intro_id: entity.intro_id,
            url: entity.url,
            created_at: entity.created_at,
        }
    }
}
