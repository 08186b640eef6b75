//! Account domain models.
//!
//! An account owns one or more invitations (intros) and, optionally, the
//! subdomain its public invitation page is served from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_subdomain_format;

lazy_static::lazy_static! {
    pub static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
}

/// Role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Owner,
    Administrator,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Owner => "owner",
            AccountRole::Administrator => "administrator",
        }
    }

    /// Administrators may act on any tenant and manage accounts.
    pub fn is_administrator(&self) -> bool {
        matches!(self, AccountRole::Administrator)
    }
}

impl FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(AccountRole::Owner),
            "administrator" => Ok(AccountRole::Administrator),
            _ => Err(format!("Invalid account role: {}", s)),
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account as exposed to callers. The password hash never leaves persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub role: AccountRole,
    pub is_active: bool,
    pub max_invite: i32,
    pub subdomain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Request payload for logging in.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request payload for exchanging a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Request payload for changing the caller's own password.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Request payload for creating an account (administrators only).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateAccountRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits, '.', '_' and '-'"
        )
    )]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub role: Option<AccountRole>,

    #[validate(range(min = 0, max = 100, message = "max_invite must be between 0 and 100"))]
    pub max_invite: Option<i32>,

    #[validate(custom(function = "validate_subdomain_format"))]
    pub subdomain: Option<String>,

    /// Create a default intro with its seed guest. Defaults to false.
    pub provision_intro: Option<bool>,
}

/// Request payload for updating an account (administrators only).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateAccountRequest {
    pub role: Option<AccountRole>,

    pub is_active: Option<bool>,

    #[validate(range(min = 0, max = 100, message = "max_invite must be between 0 and 100"))]
    pub max_invite: Option<i32>,

    pub password: Option<String>,
}

/// Request payload for assigning or clearing a subdomain.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SetSubdomainRequest {
    /// `null` clears the subdomain.
    #[validate(custom(function = "validate_subdomain_format"))]
    pub subdomain: Option<String>,
}

/// Response for subdomain reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SubdomainResponse {
    pub subdomain: Option<String>,
    /// Example guest link for the current subdomain (or the base domain).
    pub guest_url_preview: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [AccountRole::Owner, AccountRole::Administrator] {
            assert_eq!(AccountRole::from_str(role.as_str()).unwrap(), role);
            assert_eq!(role.to_string(), role.as_str());
        }
        assert!(AccountRole::from_str("root").is_err());
    }

    #[test]
    fn test_role_capabilities() {
        assert!(AccountRole::Administrator.is_administrator());
        assert!(!AccountRole::Owner.is_administrator());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&AccountRole::Administrator).unwrap();
        assert_eq!(json, "\"administrator\"");
        let role: AccountRole = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(role, AccountRole::Owner);
    }

    #[test]
    fn test_create_account_request_validation() {
        let valid = CreateAccountRequest {
            username: "nguyen.van_a".to_string(),
            password: "secret-pass".to_string(),
            role: None,
            max_invite: Some(2),
            subdomain: Some("nguyen-van-a".to_string()),
            provision_intro: None,
        };
        assert!(valid.validate().is_ok());

        let bad_username = CreateAccountRequest {
            username: "has space".to_string(),
            ..valid.clone()
        };
        assert!(bad_username.validate().is_err());

        let bad_subdomain = CreateAccountRequest {
            subdomain: Some("-bad-".to_string()),
            ..valid
        };
        assert!(bad_subdomain.validate().is_err());
    }

    #[test]
    fn test_set_subdomain_request_allows_clearing() {
        let req: SetSubdomainRequest = serde_json::from_str(r#"{"subdomain": null}"#).unwrap();
        assert!(req.subdomain.is_none());
        assert!(req.validate().is_ok());
    }
}
