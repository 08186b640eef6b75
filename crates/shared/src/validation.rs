//! Common validation rules.
//!
//! Subdomain rules live here because both the tenant directory (when a
//! subdomain is assigned) and the access resolver (when one is parsed out of a
//! host header) must agree on them exactly.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use validator::ValidationError;

pub const SUBDOMAIN_MIN_LENGTH: usize = 3;
pub const SUBDOMAIN_MAX_LENGTH: usize = 50;

/// Labels that never identify a tenant.
pub const RESERVED_SUBDOMAINS: &[&str] = &[
    "www",
    "api",
    "admin",
    "mail",
    "ftp",
    "cpanel",
    "localhost",
    "wedding",
    "app",
    "dashboard",
    "login",
    "register",
];

lazy_static! {
    static ref SUBDOMAIN_RE: Regex =
        Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").expect("valid subdomain regex");
}

/// Why a subdomain candidate was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubdomainError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("Subdomain '{0}' is reserved")]
    Reserved(String),
}

/// Trims and lowercases a subdomain candidate.
pub fn normalize_subdomain(candidate: &str) -> String {
    candidate.trim().to_ascii_lowercase()
}

pub fn is_reserved_subdomain(label: &str) -> bool {
    let label = label.trim();
    RESERVED_SUBDOMAINS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(label))
}

/// Normalizes and checks a subdomain candidate, returning the stored form.
pub fn parse_subdomain(candidate: &str) -> Result<String, SubdomainError> {
    let normalized = normalize_subdomain(candidate);
    let len = normalized.len();

    if !(SUBDOMAIN_MIN_LENGTH..=SUBDOMAIN_MAX_LENGTH).contains(&len) {
        return Err(SubdomainError::InvalidFormat(format!(
            "Subdomain must be between {} and {} characters",
            SUBDOMAIN_MIN_LENGTH, SUBDOMAIN_MAX_LENGTH
        )));
    }

    if !SUBDOMAIN_RE.is_match(&normalized) {
        return Err(SubdomainError::InvalidFormat(
            "Subdomain may only contain lowercase letters, digits and hyphens, and cannot start or end with a hyphen"
                .to_string(),
        ));
    }

    if is_reserved_subdomain(&normalized) {
        return Err(SubdomainError::Reserved(normalized));
    }

    Ok(normalized)
}

/// `validator` custom rule for request fields carrying a subdomain.
///
/// Only the format is checked here; reserved names are a conflict, not a
/// malformed request, and are reported by the tenant directory.
pub fn validate_subdomain_format(candidate: &str) -> Result<(), ValidationError> {
    match parse_subdomain(candidate) {
        Ok(_) | Err(SubdomainError::Reserved(_)) => Ok(()),
        Err(SubdomainError::InvalidFormat(msg)) => {
            let mut err = ValidationError::new("subdomain_format");
            err.message = Some(msg.into());
            Err(err)
        }
    }
}

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Image references must be absolute http(s) URLs.
pub fn validate_image_url(url: &str) -> Result<(), ValidationError> {
    let lower = url.trim().to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("image_url");
        err.message = Some("Image URL must start with http:// or https://".into());
        Err(err)
    }
}
