//! Section routes: header, family, invite, footer and date of organization.
//!
//! `/api/v1/intros/:intro_id/sections/:kind` where `kind` is one of
//! `header`, `family`, `invite`, `footer` or `date`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::section::{
    DateOfOrganization, FamilySection, FooterSection, HeaderSection, ImageReferences,
    InviteSection, SectionKind, UpsertDateRequest, UpsertFamilyRequest, UpsertFooterRequest,
    UpsertHeaderRequest, UpsertInviteRequest,
};
use persistence::repositories::{SectionRepository, SessionImageRepository};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::IntroScope;

const KIND_PARAM: &str = "kind";

fn section_kind(params: &HashMap<String, String>) -> Result<SectionKind, ApiError> {
    params
        .get(KIND_PARAM)
        .and_then(|k| k.parse().ok())
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))
}

fn section_not_found(kind: SectionKind) -> ApiError {
    ApiError::NotFound(format!("{} section not found", kind))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(format!("Serialization error: {}", e)))
}

/// Parses and validates an upsert body for one section kind.
fn parse_body<T>(body: Value) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate + ImageReferences,
{
    let request: T = serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(format!("Invalid section body: {}", e)))?;
    request.validate()?;
    Ok(request)
}

/// Every referenced image must be a session image of the same intro.
async fn ensure_images_owned(
    state: &AppState,
    intro_id: Uuid,
    request: &impl ImageReferences,
) -> Result<(), ApiError> {
    let mut ids = request.image_ids();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(());
    }

    let owned = SessionImageRepository::new(state.pool.clone())
        .count_owned(intro_id, &ids)
        .await?;
    if owned != ids.len() as i64 {
        return Err(ApiError::Validation(
            "Referenced image does not belong to this intro".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/v1/intros/:intro_id/sections/:kind
pub async fn get_section(
    State(state): State<AppState>,
    scope: IntroScope,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let kind = section_kind(&params)?;
    let repo = SectionRepository::new(state.pool.clone());
    let id = scope.intro_id;

    let value = match kind {
        SectionKind::Header => repo.find_header(id).await?.map(HeaderSection::from).map(to_json),
        SectionKind::Family => repo.find_family(id).await?.map(FamilySection::from).map(to_json),
        SectionKind::Invite => repo.find_invite(id).await?.map(InviteSection::from).map(to_json),
        SectionKind::Footer => repo.find_footer(id).await?.map(FooterSection::from).map(to_json),
        SectionKind::Date => repo
            .find_date(id)
            .await?
            .map(DateOfOrganization::from)
            .map(to_json),
    };

    value
        .transpose()?
        .map(Json)
        .ok_or_else(|| section_not_found(kind))
}

/// PUT /api/v1/intros/:intro_id/sections/:kind
///
/// Creates the section or replaces all of its fields.
pub async fn upsert_section(
    State(state): State<AppState>,
    scope: IntroScope,
    Path(params): Path<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let kind = section_kind(&params)?;
    let repo = SectionRepository::new(state.pool.clone());
    let id = scope.intro_id;

    let value = match kind {
        SectionKind::Header => {
            let request: UpsertHeaderRequest = parse_body(body)?;
            ensure_images_owned(&state, id, &request).await?;
            to_json(HeaderSection::from(repo.upsert_header(id, &request).await?))?
        }
        SectionKind::Family => {
            let request: UpsertFamilyRequest = parse_body(body)?;
            ensure_images_owned(&state, id, &request).await?;
            to_json(FamilySection::from(repo.upsert_family(id, &request).await?))?
        }
        SectionKind::Invite => {
            let request: UpsertInviteRequest = parse_body(body)?;
            ensure_images_owned(&state, id, &request).await?;
            to_json(InviteSection::from(repo.upsert_invite(id, &request).await?))?
        }
        SectionKind::Footer => {
            let request: UpsertFooterRequest = parse_body(body)?;
            ensure_images_owned(&state, id, &request).await?;
            to_json(FooterSection::from(repo.upsert_footer(id, &request).await?))?
        }
        SectionKind::Date => {
            let request: UpsertDateRequest = parse_body(body)?;
            to_json(DateOfOrganization::from(repo.upsert_date(id, &request).await?))?
        }
    };

    tracing::info!(intro_id = %id, section = %kind, "Section saved");
    Ok(Json(value))
}

/// DELETE /api/v1/intros/:intro_id/sections/:kind
pub async fn delete_section(
    State(state): State<AppState>,
    scope: IntroScope,
    Path(params): Path<HashMap<String, String>>,
) -> Result<StatusCode, ApiError> {
    let kind = section_kind(&params)?;
    let repo = SectionRepository::new(state.pool.clone());
    let id = scope.intro_id;

    let deleted = match kind {
        SectionKind::Header => repo.delete_header(id).await?,
        SectionKind::Family => repo.delete_family(id).await?,
        SectionKind::Invite => repo.delete_invite(id).await?,
        SectionKind::Footer => repo.delete_footer(id).await?,
        SectionKind::Date => repo.delete_date(id).await?,
    };

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(section_not_found(kind))
    }
}
