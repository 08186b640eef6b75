//! Session image routes: the image library of an intro.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::session_image::CreateSessionImageRequest;
use domain::models::SessionImage;
use persistence::repositories::{DeleteImageOutcome, SessionImageRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::IntroScope;

/// POST /api/v1/intros/:intro_id/images
pub async fn create_image(
    State(state): State<AppState>,
    scope: IntroScope,
    Json(request): Json<CreateSessionImageRequest>,
) -> Result<(StatusCode, Json<SessionImage>), ApiError> {
    request.validate()?;
    let image = SessionImageRepository::new(state.pool.clone())
        .create(scope.intro_id, request.url.trim())
        .await?;
    tracing::info!(image_id = %image.id, intro_id = %scope.intro_id, "Session image added");
    Ok((StatusCode::CREATED, Json(image.into())))
}

/// GET /api/v1/intros/:intro_id/images
pub async fn list_images(
    State(state): State<AppState>,
    scope: IntroScope,
) -> Result<Json<Vec<SessionImage>>, ApiError> {
    let images = SessionImageRepository::new(state.pool.clone())
        .list(scope.intro_id)
        .await?;
    Ok(Json(images.into_iter().map(Into::into).collect()))
}

/// DELETE /api/v1/intros/:intro_id/images/:image_id
///
/// Refused while a section or album still shows the image.
pub async fn delete_image(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, image_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    match SessionImageRepository::new(state.pool.clone())
        .delete(image_id, scope.intro_id)
        .await?
    {
        DeleteImageOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteImageOutcome::NotFound => Err(ApiError::NotFound("Image not found".to_string())),
        DeleteImageOutcome::StillReferenced => Err(ApiError::ReferentialConflict(
            "Image is still used by a section or album".to_string(),
        )),
    }
}
