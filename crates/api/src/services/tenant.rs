//! Tenant directory: subdomain assignment and the guest links it produces.

use domain::models::account::SubdomainResponse;
use domain::models::guest::guest_url;
use persistence::repositories::AccountRepository;
use shared::validation::{parse_subdomain, SubdomainError};
use uuid::Uuid;

use crate::config::TenancyConfig;
use crate::error::ApiError;
use crate::middleware::metrics::record_subdomain_conflict;

/// Placeholder guest id shown in link previews.
const PREVIEW_GUEST_ID: Uuid = Uuid::nil();

/// Sample guest link for an account with `subdomain`.
pub fn guest_url_preview(tenancy: &TenancyConfig, subdomain: Option<&str>) -> String {
    guest_url(
        &tenancy.public_scheme,
        &tenancy.base_domain,
        subdomain,
        PREVIEW_GUEST_ID,
    )
}

/// Shareable link of one guest.
pub fn guest_link(tenancy: &TenancyConfig, subdomain: Option<&str>, guest_id: Uuid) -> String {
    guest_url(&tenancy.public_scheme, &tenancy.base_domain, subdomain, guest_id)
}

/// Subdomain usable in guest links of `intro_id`.
///
/// A subdomain only serves the oldest intro of its account, so guests of any
/// other intro get base-domain links.
pub fn link_subdomain(
    subdomain: Option<String>,
    first_intro: Option<Uuid>,
    intro_id: Uuid,
) -> Option<String> {
    subdomain.filter(|_| first_intro == Some(intro_id))
}

/// Validates a requested subdomain without touching the database.
pub fn check_candidate(candidate: &str) -> Result<String, ApiError> {
    parse_subdomain(candidate).map_err(|e| match e {
        SubdomainError::InvalidFormat(_) => ApiError::Validation(e.to_string()),
        SubdomainError::Reserved(_) => {
            record_subdomain_conflict("reserved");
            ApiError::Conflict(e.to_string())
        }
    })
}

/// Assigns, replaces or clears the subdomain of an account.
pub async fn set_subdomain(
    accounts: &AccountRepository,
    tenancy: &TenancyConfig,
    account_id: Uuid,
    candidate: Option<&str>,
) -> Result<SubdomainResponse, ApiError> {
    let subdomain = match candidate {
        Some(raw) => {
            let subdomain = check_candidate(raw)?;
            if accounts.is_subdomain_taken(&subdomain, account_id).await? {
                record_subdomain_conflict("taken");
                return Err(ApiError::Conflict("Subdomain is already taken".to_string()));
            }
            Some(subdomain)
        }
        None => None,
    };

    // The unique index decides races between two claims of the same name.
    let updated = accounts
        .set_subdomain(account_id, subdomain.as_deref())
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                record_subdomain_conflict("taken");
                ApiError::Conflict("Subdomain is already taken".to_string())
            }
            other => other,
        })?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    tracing::info!(
        account_id = %account_id,
        subdomain = ?updated.subdomain,
        "Subdomain updated"
    );

    Ok(SubdomainResponse {
        guest_url_preview: guest_url_preview(tenancy, updated.subdomain.as_deref()),
        subdomain: updated.subdomain,
    })
}
