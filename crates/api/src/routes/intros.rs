//! Intro routes: the owner's invitations.
//!
//! Routes under `/api/v1/intros/:intro_id` run behind the ownership guard and
//! receive the authorized intro as an [`IntroScope`].

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use domain::models::intro::{CreateIntroRequest, UpdateIntroRequest};
use domain::models::{GuestStats, Intro, LandingPage};
use persistence::repositories::{CreateIntroOutcome, GuestRepository, IntroRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{IntroScope, UserAuth};
use crate::services::LandingService;

/// POST /api/v1/intros
///
/// Creates the intro with its seed guest and default sections. Refused with
/// Conflict once the account holds `max_invite` intros.
pub async fn create_intro(
    State(state): State<AppState>,
    user_auth: UserAuth,
    body: Option<Json<CreateIntroRequest>>,
) -> Result<(StatusCode, Json<Intro>), ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;

    let outcome = IntroRepository::new(state.pool.clone())
        .create_checked(user_auth.account_id, &request)
        .await?;

    match outcome {
        CreateIntroOutcome::Created(intro) => {
            info!(intro_id = %intro.id, account_id = %user_auth.account_id, "Intro created");
            Ok((StatusCode::CREATED, Json(intro.into())))
        }
        CreateIntroOutcome::QuotaReached { max_invite } => Err(ApiError::Conflict(format!(
            "Intro limit reached ({} allowed)",
            max_invite
        ))),
        CreateIntroOutcome::AccountNotFound => {
            Err(ApiError::Unauthorized("Account is not active".to_string()))
        }
    }
}

/// GET /api/v1/intros
pub async fn list_intros(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<Intro>>, ApiError> {
    let intros = IntroRepository::new(state.pool.clone())
        .list_by_account(user_auth.account_id)
        .await?;
    Ok(Json(intros.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/intros/:intro_id
pub async fn get_intro(
    State(state): State<AppState>,
    scope: IntroScope,
) -> Result<Json<Intro>, ApiError> {
    let intro = IntroRepository::new(state.pool.clone())
        .find_by_id(scope.intro_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Intro not found".to_string()))?;
    Ok(Json(intro.into()))
}

/// PUT /api/v1/intros/:intro_id
pub async fn update_intro(
    State(state): State<AppState>,
    scope: IntroScope,
    Json(request): Json<UpdateIntroRequest>,
) -> Result<Json<Intro>, ApiError> {
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let intro = IntroRepository::new(state.pool.clone())
        .update(scope.intro_id, &request)
        .await?
        .ok_or_else(|| ApiError::NotFound("Intro not found".to_string()))?;
    Ok(Json(intro.into()))
}

/// DELETE /api/v1/intros/:intro_id
///
/// Removes everything the intro owns.
pub async fn delete_intro(
    State(state): State<AppState>,
    scope: IntroScope,
) -> Result<StatusCode, ApiError> {
    let deleted = IntroRepository::new(state.pool.clone())
        .delete(scope.intro_id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Intro not found".to_string()));
    }
    info!(intro_id = %scope.intro_id, "Intro deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/intros/:intro_id/preview
pub async fn preview_intro(
    State(state): State<AppState>,
    scope: IntroScope,
) -> Result<Json<LandingPage>, ApiError> {
    let page = LandingService::new(state.pool.clone())
        .preview(scope.intro_id)
        .await?;
    Ok(Json(page))
}

/// GET /api/v1/intros/:intro_id/stats
pub async fn intro_stats(
    State(state): State<AppState>,
    scope: IntroScope,
) -> Result<Json<GuestStats>, ApiError> {
    let stats = GuestRepository::new(state.pool.clone())
        .stats(scope.intro_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Intro not found".to_string()))?;
    Ok(Json(stats.into()))
}
