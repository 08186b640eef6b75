//! Public landing routes. No authentication; the guest id is the credential.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::guest::ConfirmationOutcome;
use domain::models::LandingPage;
use domain::services::access::candidate_subdomain;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::TenantHost;
use crate::services::landing::ResolvedInvitation;
use crate::services::LandingService;

/// Malformed ids name no invitation.
fn parse_guest_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invitation_not_found())
}

async fn by_subdomain(
    state: &AppState,
    tenant: &TenantHost,
    guest_id: Option<Uuid>,
) -> Result<ResolvedInvitation, ApiError> {
    let subdomain = candidate_subdomain(
        &state.resolver,
        tenant.host.as_deref(),
        tenant.explicit_subdomain.as_deref(),
    )
    .ok_or_else(ApiError::invitation_not_found)?;

    LandingService::new(state.pool.clone())
        .resolve_by_subdomain(&subdomain, guest_id)
        .await
}

/// GET /api/v1/landing/by-subdomain
pub async fn subdomain_landing(
    State(state): State<AppState>,
    tenant: TenantHost,
) -> Result<Json<LandingPage>, ApiError> {
    let resolved = by_subdomain(&state, &tenant, None).await?;
    let page = LandingService::new(state.pool.clone()).page(resolved).await?;
    Ok(Json(page))
}

/// GET /api/v1/landing/by-subdomain/:guest_id
pub async fn subdomain_guest_landing(
    State(state): State<AppState>,
    tenant: TenantHost,
    Path(guest_id): Path<String>,
) -> Result<Json<LandingPage>, ApiError> {
    let guest_id = parse_guest_id(&guest_id)?;
    let resolved = by_subdomain(&state, &tenant, Some(guest_id)).await?;
    let page = LandingService::new(state.pool.clone()).page(resolved).await?;
    Ok(Json(page))
}

/// POST /api/v1/landing/by-subdomain/:guest_id/confirm
pub async fn subdomain_confirm(
    State(state): State<AppState>,
    tenant: TenantHost,
    Path(guest_id): Path<String>,
) -> Result<Json<ConfirmationOutcome>, ApiError> {
    let guest_id = parse_guest_id(&guest_id)?;
    let resolved = by_subdomain(&state, &tenant, Some(guest_id)).await?;
    let outcome = LandingService::new(state.pool.clone())
        .confirm(&resolved)
        .await?;
    Ok(Json(outcome))
}

/// GET /api/v1/landing/public/:guest_id
pub async fn public_landing(
    State(state): State<AppState>,
    Path(guest_id): Path<String>,
) -> Result<Json<LandingPage>, ApiError> {
    let guest_id = parse_guest_id(&guest_id)?;
    let service = LandingService::new(state.pool.clone());
    let resolved = service.resolve_by_guest(guest_id).await?;
    Ok(Json(service.page(resolved).await?))
}

/// POST /api/v1/landing/public/:guest_id/confirm
pub async fn public_confirm(
    State(state): State<AppState>,
    Path(guest_id): Path<String>,
) -> Result<Json<ConfirmationOutcome>, ApiError> {
    let guest_id = parse_guest_id(&guest_id)?;
    let service = LandingService::new(state.pool.clone());
    let resolved = service.resolve_by_guest(guest_id).await?;
    Ok(Json(service.confirm(&resolved).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::INVITATION_NOT_FOUND;

    #[test]
    fn test_malformed_guest_id_is_invitation_not_found() {
        match parse_guest_id("not-a-uuid") {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, INVITATION_NOT_FOUND),
            other => panic!("unexpected {other:?}"),
        }
        let id = Uuid::new_v4();
        assert_eq!(parse_guest_id(&id.to_string()).unwrap(), id);
    }
}
