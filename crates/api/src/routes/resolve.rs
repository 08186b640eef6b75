//! Request classification exposed to front ends.
//!
//! The front end forwards the path it is rendering; the host and
//! `X-Subdomain` headers of this call identify the tenant the same way they
//! would for a landing request.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{Account, Intro, LandingPage};
use domain::services::access::{classify, AccessRequest, AccessRoute};
use persistence::repositories::{AccountRepository, IntroRepository};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{OptionalUserAuth, TenantHost};
use crate::services::LandingService;

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub path: String,
}

/// Classification plus the data the route needs.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub route: AccessRoute,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intros: Option<Vec<Intro>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing: Option<LandingPage>,
}

/// GET /api/v1/resolve?path=...
pub async fn resolve(
    State(state): State<AppState>,
    tenant: TenantHost,
    OptionalUserAuth(user_auth): OptionalUserAuth,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let route = classify(
        &state.resolver,
        &AccessRequest {
            host: tenant.host.as_deref(),
            explicit_subdomain: tenant.explicit_subdomain.as_deref(),
            path: &query.path,
        },
    );
    tracing::debug!(path = %query.path, route = ?route, "Request classified");

    match route {
        AccessRoute::AdminSession => {
            // The subdomain plays no part here; only the token does.
            let user_auth = user_auth
                .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;
            let account = AccountRepository::new(state.pool.clone())
                .find_by_id(user_auth.account_id)
                .await?
                .ok_or_else(|| ApiError::Unauthorized("Account is not active".to_string()))?;
            let intros = IntroRepository::new(state.pool.clone())
                .list_by_account(account.id)
                .await?;

            Ok(Json(ResolveResponse {
                route,
                account: Some(account.into()),
                intros: Some(intros.into_iter().map(Into::into).collect()),
                landing: None,
            }))
        }
        AccessRoute::NotFound => Err(ApiError::invitation_not_found()),
        public => {
            let service = LandingService::new(state.pool.clone());
            let resolved = service.resolve(&public).await?;
            let landing = service.page(resolved).await?;
            Ok(Json(ResolveResponse {
                route: public,
                account: None,
                intros: None,
                landing: Some(landing),
            }))
        }
    }
}
