//! Account entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Account, AccountRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
pub enum AccountRoleDb {
    Owner,
    Administrator,
}

impl From<AccountRoleDb> for AccountRole {
    fn from(role: AccountRoleDb) -> Self {
        match role {
            AccountRoleDb::Owner => AccountRole::Owner,
            AccountRoleDb::Administrator => AccountRole::Administrator,
        }
    }
}

impl From<AccountRole> for AccountRoleDb {
    fn from(role: AccountRole) -> Self {
        match role {
            AccountRole::Owner => AccountRoleDb::Owner,
            AccountRole::Administrator => AccountRoleDb::Administrator,
        }
    }
}

/// Database row mapping for the accounts table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountEntity {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: AccountRoleDb,
    pub is_active: bool,
    pub max_invite: i32,
    pub subdomain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<AccountEntity> for Account {
    fn from(entity: AccountEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            role: entity.role.into(),
            is_active: entity.is_active,
            max_invite: entity.max_invite,
            subdomain: entity.subdomain,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            last_login_at: entity.last_login_at,
        }
    }
}

/// Database row mapping for the account_sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountSessionEntity {
    pub id: Uuid,
    pub account_id: Uuid,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}
