//! The ownership guard.
//!
//! Runs once per request, after [`require_user_auth`], and turns
//! `(caller, resource owner, required role)` into allow or deny. Intro-scoped
//! routes get an [`IntroScope`] in their extensions; a caller who may not see
//! the intro gets the same 404 as for an intro that does not exist.
//!
//! [`require_user_auth`]: crate::middleware::user_auth::require_user_auth

use axum::{
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::services::authorization::{authorize, AccessDecision, DenyReason, RequiredRole};
use persistence::repositories::IntroRepository;
use std::collections::HashMap;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::UserAuth;

/// Path parameter naming the intro of an intro-scoped route.
pub const INTRO_PARAM: &str = "intro_id";

/// The intro a request was authorized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroScope {
    pub intro_id: Uuid,
    pub owner_id: Uuid,
}

fn denial(reason: DenyReason, what: &str) -> ApiError {
    match reason {
        DenyReason::NotFound => ApiError::NotFound(format!("{} not found", what)),
        DenyReason::Forbidden => ApiError::Forbidden("Administrator role required".to_string()),
    }
}

fn current_user(req: &Request<Body>) -> Result<UserAuth, ApiError> {
    req.extensions()
        .get::<UserAuth>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
}

/// Allows the intro's owner and administrators.
pub async fn require_intro_access(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth = match current_user(&req) {
        Ok(auth) => auth,
        Err(e) => return e.into_response(),
    };

    // A malformed id names nothing, same as an unknown one.
    let owner = match params.get(INTRO_PARAM).and_then(|v| Uuid::parse_str(v).ok()) {
        Some(intro_id) => {
            match IntroRepository::new(state.pool.clone()).owner_of(intro_id).await {
                Ok(owner) => owner.map(|owner_id| IntroScope { intro_id, owner_id }),
                Err(e) => return ApiError::from(e).into_response(),
            }
        }
        None => None,
    };

    match (
        authorize(&auth.caller(), owner.map(|s| s.owner_id), RequiredRole::Owner),
        owner,
    ) {
        (AccessDecision::Allow, Some(scope)) => {
            req.extensions_mut().insert(scope);
            next.run(req).await
        }
        (AccessDecision::Deny(reason), _) => {
            tracing::debug!(
                account_id = %auth.account_id,
                intro_param = ?params.get(INTRO_PARAM),
                "Intro access denied"
            );
            denial(reason, "Intro").into_response()
        }
        (AccessDecision::Allow, None) => denial(DenyReason::NotFound, "Intro").into_response(),
    }
}

/// Allows administrators only.
pub async fn require_administrator(req: Request<Body>, next: Next) -> Response {
    let auth = match current_user(&req) {
        Ok(auth) => auth,
        Err(e) => return e.into_response(),
    };

    match authorize(&auth.caller(), None, RequiredRole::Administrator) {
        AccessDecision::Allow => next.run(req).await,
        AccessDecision::Deny(reason) => denial(reason, "Resource").into_response(),
    }
}
