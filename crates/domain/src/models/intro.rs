//! Intro domain models.
//!
//! An intro is one wedding invitation (a tenant): the couple's names plus the
//! join point for every section, album, image and guest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_not_blank;

/// Placeholder names used when an intro is provisioned without input.
pub const DEFAULT_GROOM_NAME: &str = "Groom";
pub const DEFAULT_GROOM_FULL_NAME: &str = "Groom Full Name";
pub const DEFAULT_BRIDE_NAME: &str = "Bride";
pub const DEFAULT_BRIDE_FULL_NAME: &str = "Bride Full Name";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Intro {
    pub id: Uuid,
    pub account_id: Uuid,
    pub groom_name: String,
    pub groom_full_name: String,
    pub bride_name: String,
    pub bride_full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Couple names supplied when creating an intro.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateIntroRequest {
    #[validate(
        length(min = 1, max = 255, message = "Groom name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub groom_name: String,

    #[validate(
        length(min = 1, max = 255, message = "Groom full name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub groom_full_name: String,

    #[validate(
        length(min = 1, max = 255, message = "Bride name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub bride_name: String,

    #[validate(
        length(min = 1, max = 255, message = "Bride full name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub bride_full_name: String,
}

impl Default for CreateIntroRequest {
    fn default() -> Self {
        Self {
            groom_name: DEFAULT_GROOM_NAME.to_string(),
            groom_full_name: DEFAULT_GROOM_FULL_NAME.to_string(),
            bride_name: DEFAULT_BRIDE_NAME.to_string(),
            bride_full_name: DEFAULT_BRIDE_FULL_NAME.to_string(),
        }
    }
}

/// Partial update of the couple names.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateIntroRequest {
    #[validate(length(min = 1, max = 255, message = "Groom name must be 1-255 characters"))]
    pub groom_name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Groom full name must be 1-255 characters"))]
    pub groom_full_name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Bride name must be 1-255 characters"))]
    pub bride_name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Bride full name must be 1-255 characters"))]
    pub bride_full_name: Option<String>,
}

impl UpdateIntroRequest {
    pub fn is_empty(&self) -> bool {
        self.groom_name.is_none()
            && self.groom_full_name.is_none()
            && self.bride_name.is_none()
            && self.bride_full_name.is_none()
    }
}
