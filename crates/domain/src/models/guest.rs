//! Guest domain models.
//!
//! A guest's id doubles as the unguessable access token embedded in share
//! links, so it is generated server side and never changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_not_blank;

/// Name given to the guest provisioned alongside every intro.
pub const SEED_GUEST_NAME: &str = "Demo Guest";
pub const SEED_GUEST_RELATIONSHIP: &str = "Demo";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Guest {
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

/// Guest as listed on the owner dashboard, with its share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestListItem {
    #[serde(flatten)]
    pub guest: Guest,
    pub guest_url: String,
}

/// Guest fields merged into a public landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PublicGuest {
    pub id: Uuid,
    pub name: String,
    pub user_relationship: String,
    pub confirmed: bool,
}

impl From<&Guest> for PublicGuest {
    fn from(guest: &Guest) -> Self {
        Self {
            id: guest.id,
            name: guest.name.clone(),
            user_relationship: guest.user_relationship.clone(),
            confirmed: guest.confirmed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGuestRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(length(max = 255, message = "Relationship must be at most 255 characters"))]
    #[serde(default)]
    pub user_relationship: String,
}

/// Owner edit of a guest. Unlike the public confirm action this may reset
/// `confirmed` back to false.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateGuestRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(length(max = 255, message = "Relationship must be at most 255 characters"))]
    pub user_relationship: Option<String>,

    pub confirmed: Option<bool>,
}

/// Query parameters for listing guests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListGuestsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub confirmed: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GuestStats {
    pub total: i64,
    pub confirmed: i64,
    pub pending: i64,
    /// The owning account's intro quota.
    pub max_allowed: i32,
}

impl GuestStats {
    pub fn new(total: i64, confirmed: i64, max_allowed: i32) -> Self {
        Self {
            total,
            confirmed,
            pending: (total - confirmed).max(0),
            max_allowed,
        }
    }
}

/// Result of a confirm action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfirmationOutcome {
    /// True when the guest had confirmed before this call; nothing was written.
    pub already_confirmed: bool,
    pub guest: PublicGuest,
}

/// Builds the shareable link for a guest.
///
/// With a subdomain the link is `{scheme}://{subdomain}.{base}/{id}`, otherwise
/// `{scheme}://{base}/{id}`.
pub fn guest_url(scheme: &str, base_domain: &str, subdomain: Option<&str>, guest_id: Uuid) -> String {
    match subdomain {
        Some(sub) if !sub.is_empty() => {
            format!("{}://{}.{}/{}", scheme, sub, base_domain, guest_id)
        }
        _ => format!("{}://{}/{}", scheme, base_domain, guest_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn sample_guest() -> Guest {
        let now = Utc::now();
        Guest {
            id: Uuid::new_v4(),
            intro_id: Uuid::new_v4(),
            name: Name().fake(),
            user_relationship: "Friend".to_string(),
            confirmed: false,
            confirmed_at: None,
            is_seed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_guest_url_with_subdomain() {
        let id = Uuid::new_v4();
        assert_eq!(
            guest_url("https", "thiepcuoi.example.com", Some("nguyen-van-a"), id),
            format!("https://nguyen-van-a.thiepcuoi.example.com/{}", id)
        );
    }

    #[test]
    fn test_guest_url_without_subdomain() {
        let id = Uuid::new_v4();
        assert_eq!(
            guest_url("http", "localhost:3000", None, id),
            format!("http://localhost:3000/{}", id)
        );
        assert_eq!(
            guest_url("http", "localhost:3000", Some(""), id),
            format!("http://localhost:3000/{}", id)
        );
    }

    #[test]
    fn test_stats_pending() {
        let stats = GuestStats::new(5, 2, 1);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.max_allowed, 1);
    }

    #[test]
    fn test_public_guest_hides_internal_fields() {
        let guest = sample_guest();
        let public = PublicGuest::from(&guest);
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("intro_id").is_none());
        assert!(json.get("is_seed").is_none());
        assert_eq!(json["name"], guest.name);
    }

    #[test]
    fn test_list_item_flattens_guest() {
        let guest = sample_guest();
        let item = GuestListItem {
            guest_url: guest_url("https", "example.com", None, guest.id),
            guest,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["is_seed"], false);
        assert!(json["guest_url"].as_str().unwrap().starts_with("https://example.com/"));
    }

    #[test]
    fn test_create_guest_validation() {
        let ok = CreateGuestRequest {
            name: "Cô Ba".to_string(),
            user_relationship: String::new(),
        };
        assert!(ok.validate().is_ok());

        let blank = CreateGuestRequest {
            name: "  ".to_string(),
            user_relationship: String::new(),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_create_guest_relationship_defaults() {
        let req: CreateGuestRequest = serde_json::from_str(r#"{"name":"Anh Tư"}"#).unwrap();
        assert_eq!(req.user_relationship, "");
    }
}
