//! Guest entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Guest, GuestStats};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the guests table.
#[derive(Debug, Clone, FromRow)]
pub struct GuestEntity {
    pub id: Uuid,
    pub intro_id: Uuid,
    pub name: String,
    pub user_relationship: String,
    pub confirmed: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub is_seed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GuestEntity> for Guest {
    fn from(entity: GuestEntity) -> Self {
        Self {
            id: entity.id,
            intro_id: entity.intro_id,
            name: entity.name,
            user_relationship: entity.user_relationship,
            confirmed: entity.confirmed,
            confirmed_at: entity.confirmed_at,
            is_seed: entity.is_seed,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Result row of the conditional confirm statement.
#[derive(Debug, Clone, FromRow)]
pub struct GuestConfirmationRow {
    #[sqlx(flatten)]
    pub guest: GuestEntity,
    pub already_confirmed: bool,
}

/// Aggregate counts for one intro.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct GuestStatsRow {
    pub total: i64,
    pub confirmed: i64,
    pub max_allowed: i32,
}

impl From<GuestStatsRow> for GuestStats {
    fn from(row: GuestStatsRow) -> Self {
        GuestStats::new(row.total, row.confirmed, row.max_allowed)
    }
}
