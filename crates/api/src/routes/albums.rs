//! Album routes: sessions of an intro and the ordered images in each.
//!
//! Every write answers with the state after the write, so clients never have
//! to guess renumbered orders.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::album::{
    AddAlbumImageRequest, CreateAlbumSessionRequest, ReorderAlbumImagesRequest,
    UpdateAlbumSessionRequest,
};
use domain::models::{AlbumImage, AlbumSession, AlbumSessionWithImages};
use domain::services::ordering::Placement;
use persistence::entities::AlbumImageRow;
use persistence::repositories::AlbumRepository;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::IntroScope;
use crate::services::landing::group_albums;

fn session_not_found() -> ApiError {
    ApiError::NotFound("Album session not found".to_string())
}

fn images(rows: Vec<AlbumImageRow>) -> Json<Vec<AlbumImage>> {
    Json(rows.into_iter().map(Into::into).collect())
}

/// GET /api/v1/intros/:intro_id/albums
pub async fn list_albums(
    State(state): State<AppState>,
    scope: IntroScope,
) -> Result<Json<Vec<AlbumSessionWithImages>>, ApiError> {
    let repo = AlbumRepository::new(state.pool.clone());
    let (sessions, images) = tokio::try_join!(
        repo.list_sessions(scope.intro_id),
        repo.list_images_for_intro(scope.intro_id),
    )?;
    Ok(Json(group_albums(sessions, images)))
}

/// POST /api/v1/intros/:intro_id/albums
pub async fn create_album(
    State(state): State<AppState>,
    scope: IntroScope,
    Json(request): Json<CreateAlbumSessionRequest>,
) -> Result<(StatusCode, Json<AlbumSession>), ApiError> {
    request.validate()?;
    let session = AlbumRepository::new(state.pool.clone())
        .create_session(scope.intro_id, request.title.trim())
        .await?;
    tracing::info!(album_id = %session.id, intro_id = %scope.intro_id, "Album session created");
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// GET /api/v1/intros/:intro_id/albums/:album_id
pub async fn get_album(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, album_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AlbumSessionWithImages>, ApiError> {
    let repo = AlbumRepository::new(state.pool.clone());
    let session = repo
        .find_session(album_id, scope.intro_id)
        .await?
        .ok_or_else(session_not_found)?;
    let images = repo.list_images(session.id).await?;

    Ok(Json(AlbumSessionWithImages {
        session: session.into(),
        images: images.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/v1/intros/:intro_id/albums/:album_id
pub async fn update_album(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, album_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateAlbumSessionRequest>,
) -> Result<Json<AlbumSession>, ApiError> {
    request.validate()?;
    let session = AlbumRepository::new(state.pool.clone())
        .update_session_title(album_id, scope.intro_id, request.title.trim())
        .await?
        .ok_or_else(session_not_found)?;
    Ok(Json(session.into()))
}

/// DELETE /api/v1/intros/:intro_id/albums/:album_id
///
/// Remaining sessions are renumbered 1..N.
pub async fn delete_album(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, album_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let deleted = AlbumRepository::new(state.pool.clone())
        .delete_session(album_id, scope.intro_id)
        .await?;
    if !deleted {
        return Err(session_not_found());
    }
    tracing::info!(album_id = %album_id, intro_id = %scope.intro_id, "Album session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/intros/:intro_id/albums/:album_id/images
///
/// Appends, or inserts at `order` and shifts the images after it.
pub async fn add_album_image(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, album_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<AddAlbumImageRequest>,
) -> Result<(StatusCode, Json<Vec<AlbumImage>>), ApiError> {
    request.validate()?;
    let rows = AlbumRepository::new(state.pool.clone())
        .add_image(album_id, scope.intro_id, request.session_image_id, request.order)
        .await?;
    Ok((StatusCode::CREATED, images(rows)))
}

/// DELETE /api/v1/intros/:intro_id/albums/:album_id/images/:image_id
pub async fn remove_album_image(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, album_id, image_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<Vec<AlbumImage>>, ApiError> {
    let rows = AlbumRepository::new(state.pool.clone())
        .remove_image(album_id, scope.intro_id, image_id)
        .await?;
    Ok(images(rows))
}

/// PUT /api/v1/intros/:intro_id/albums/:album_id/order
///
/// Requested orders are a ranking; the result is renumbered 1..N.
pub async fn reorder_album_images(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, album_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ReorderAlbumImagesRequest>,
) -> Result<Json<Vec<AlbumImage>>, ApiError> {
    request.validate()?;
    let placements: Vec<Placement> = request
        .image_orders
        .iter()
        .map(|o| Placement::new(o.id, o.order))
        .collect();

    let rows = AlbumRepository::new(state.pool.clone())
        .reorder_images(album_id, scope.intro_id, &placements)
        .await?;
    Ok(images(rows))
}
