//! Photo album models.
//!
//! Sessions are ordered within their intro and images within their session;
//! both orders are kept as a contiguous 1..N sequence.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use shared::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlbumSession {
    pub id: Uuid,
    pub intro_id: Uuid,
    pub title: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlbumImage {
    pub id: Uuid,
    pub album_session_id: Uuid,
    pub session_image_id: Uuid,
    pub order: i32,
    /// Resolved from the referenced session image.
    pub url: String,
}

/// A session together with its images, sorted by order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlbumSessionWithImages {
    #[serde(flatten)]
    pub session: AlbumSession,
    pub images: Vec<AlbumImage>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateAlbumSessionRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateAlbumSessionRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
}

/// Adds a session image to an album. Without `order` the image is appended;
/// with it, the image is inserted there and later images shift down.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AddAlbumImageRequest {
    pub session_image_id: Uuid,

    #[validate(range(min = 1, message = "Order must be at least 1"))]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageOrder {
    pub id: Uuid,
    pub order: i32,
}

/// Desired positions for album images. Positions are relative: the result is
/// always renumbered to 1..N.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ReorderAlbumImagesRequest {
    #[validate(
        length(min = 1, message = "At least one image order is required"),
        custom(function = "validate_unique_ids")
    )]
    pub image_orders: Vec<ImageOrder>,
}

fn validate_unique_ids(orders: &[ImageOrder]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::with_capacity(orders.len());
    if orders.iter().all(|o| seen.insert(o.id)) {
        Ok(())
    } else {
        let mut err = ValidationError::new("duplicate_id");
        err.message = Some("Each image may appear only once".into());
        Err(err)
    }
}
