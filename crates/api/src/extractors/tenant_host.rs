//! Tenant identity headers of a public request.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::convert::Infallible;

/// Header that names the tenant explicitly, for front ends served from the
/// base domain.
pub const SUBDOMAIN_HEADER: &str = "x-subdomain";

/// The `Host` and `X-Subdomain` values of a request, unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantHost {
    pub host: Option<String>,
    pub explicit_subdomain: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantHost
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let host = header_value(header::HOST.as_str())
            .or_else(|| parts.uri.authority().map(|a| a.as_str().to_string()));

        Ok(TenantHost {
            host,
            explicit_subdomain: header_value(SUBDOMAIN_HEADER),
        })
    }
}
