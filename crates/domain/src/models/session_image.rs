//! Session images: stored image references owned by an intro.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_image_url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionImage {
    pub id: Uuid,
    pub intro_id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Registers an already uploaded image by URL.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateSessionImageRequest {
    #[validate(
        length(min = 1, max = 500, message = "URL must be 1-500 characters"),
        custom(function = "validate_image_url")
    )]
    pub url: String,
}
