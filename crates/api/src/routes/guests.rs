//! Guest routes of an intro.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::guest::{
    CreateGuestRequest, GuestListItem, ListGuestsQuery, UpdateGuestRequest,
};
use domain::models::Guest;
use persistence::repositories::{
    AccountRepository, DeleteGuestOutcome, GuestChanges, GuestRepository, IntroRepository,
};
use shared::pagination::{Page, PageRequest};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::IntroScope;
use crate::services::tenant::{guest_link, link_subdomain};

/// Subdomain for the intro's guest links, if the owner's subdomain serves it.
async fn owner_subdomain(state: &AppState, scope: &IntroScope) -> Result<Option<String>, ApiError> {
    let accounts = AccountRepository::new(state.pool.clone());
    let intros = IntroRepository::new(state.pool.clone());
    let (account, first_intro) = tokio::try_join!(
        accounts.find_by_id(scope.owner_id),
        intros.first_of_account(scope.owner_id),
    )?;

    Ok(link_subdomain(
        account.and_then(|a| a.subdomain),
        first_intro,
        scope.intro_id,
    ))
}

fn list_item(state: &AppState, subdomain: Option<&str>, guest: Guest) -> GuestListItem {
    GuestListItem {
        guest_url: guest_link(&state.config.tenancy, subdomain, guest.id),
        guest,
    }
}

fn guest_not_found() -> ApiError {
    ApiError::NotFound("Guest not found".to_string())
}

/// GET /api/v1/intros/:intro_id/guests
///
/// Oldest first. `?confirmed=true|false` filters by attendance.
pub async fn list_guests(
    State(state): State<AppState>,
    scope: IntroScope,
    Query(query): Query<ListGuestsQuery>,
) -> Result<Json<Page<GuestListItem>>, ApiError> {
    let limits = &state.config.limits;
    let page = PageRequest::new(
        query.page,
        query.page_size,
        limits.default_page_size,
        limits.max_page_size,
    );

    let repo = GuestRepository::new(state.pool.clone());
    let (guests, total) = tokio::try_join!(
        repo.list(scope.intro_id, query.confirmed, page.limit(), page.offset()),
        repo.count(scope.intro_id, query.confirmed),
    )?;

    let subdomain = owner_subdomain(&state, &scope).await?;
    let items = guests
        .into_iter()
        .map(|g| list_item(&state, subdomain.as_deref(), g.into()))
        .collect();

    Ok(Json(Page::new(items, total, page)))
}

/// POST /api/v1/intros/:intro_id/guests
pub async fn create_guest(
    State(state): State<AppState>,
    scope: IntroScope,
    Json(request): Json<CreateGuestRequest>,
) -> Result<(StatusCode, Json<GuestListItem>), ApiError> {
    request.validate()?;

    let guest = GuestRepository::new(state.pool.clone())
        .create(
            scope.intro_id,
            request.name.trim(),
            request.user_relationship.trim(),
        )
        .await?;

    info!(guest_id = %guest.id, intro_id = %scope.intro_id, "Guest created");

    let subdomain = owner_subdomain(&state, &scope).await?;
    Ok((
        StatusCode::CREATED,
        Json(list_item(&state, subdomain.as_deref(), guest.into())),
    ))
}

/// GET /api/v1/intros/:intro_id/guests/:guest_id
pub async fn get_guest(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, guest_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GuestListItem>, ApiError> {
    let guest = GuestRepository::new(state.pool.clone())
        .find_in_intro(guest_id, scope.intro_id)
        .await?
        .ok_or_else(guest_not_found)?;

    let subdomain = owner_subdomain(&state, &scope).await?;
    Ok(Json(list_item(&state, subdomain.as_deref(), guest.into())))
}

/// PUT /api/v1/intros/:intro_id/guests/:guest_id
///
/// The owner may also reset a confirmation.
pub async fn update_guest(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, guest_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateGuestRequest>,
) -> Result<Json<GuestListItem>, ApiError> {
    request.validate()?;

    let guest = GuestRepository::new(state.pool.clone())
        .update(
            guest_id,
            scope.intro_id,
            GuestChanges {
                name: request.name.as_deref().map(str::trim),
                user_relationship: request.user_relationship.as_deref().map(str::trim),
                confirmed: request.confirmed,
            },
        )
        .await?
        .ok_or_else(guest_not_found)?;

    let subdomain = owner_subdomain(&state, &scope).await?;
    Ok(Json(list_item(&state, subdomain.as_deref(), guest.into())))
}

/// DELETE /api/v1/intros/:intro_id/guests/:guest_id
pub async fn delete_guest(
    State(state): State<AppState>,
    scope: IntroScope,
    Path((_, guest_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    match GuestRepository::new(state.pool.clone())
        .delete(guest_id, scope.intro_id)
        .await?
    {
        DeleteGuestOutcome::Deleted => {
            info!(guest_id = %guest_id, intro_id = %scope.intro_id, "Guest deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteGuestOutcome::NotFound => Err(guest_not_found()),
        DeleteGuestOutcome::SeedProtected => Err(ApiError::ReferentialConflict(
            "The demo guest of an intro cannot be deleted".to_string(),
        )),
    }
}
