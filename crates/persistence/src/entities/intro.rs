//! Intro entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Intro;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the intros table.
#[derive(Debug, Clone, FromRow)]
pub struct IntroEntity {
    pub id: Uuid,
    pub account_id: Uuid,
    pub groom_name: String,
    pub groom_full_name: String,
    pub bride_name: String,
    pub bride_full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<IntroEntity> for Intro {
    fn from(entity: IntroEntity) -> Self {
        Self {
            id: entity.id,
            account_id: entity.account_id,
            groom_name: entity.groom_name,
            groom_full_name: entity.groom_full_name,
            bride_name: entity.bride_name,
            bride_full_name: entity.bride_full_name,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
