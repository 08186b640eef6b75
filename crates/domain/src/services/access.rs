//! Access resolution for incoming requests.
//!
//! Classifies a request by its host, optional `X-Subdomain` value and path into
//! one of four outcomes. No lookups happen here; the api layer turns the
//! outcome into tenant, guest and visibility decisions.
//!
//! Subdomain detection uses a single rule: a host carries a subdomain only when
//! it has at least one more dot-separated label than the base domain. For a
//! base domain of `thiepcuoi.example.com` (3 labels) that means
//! `nguyen-van-a.thiepcuoi.example.com` (4 labels) and longer.

use serde::Serialize;
use uuid::Uuid;

use shared::validation::parse_subdomain;

/// Path prefix accepted in front of a guest id on the base domain.
pub const PUBLIC_PATH_PREFIX: &str = "public";

/// Paths handled by the owner dashboard by default.
pub const DEFAULT_ADMIN_PATHS: &[&str] = &["login", "dashboard", "edit", "preview"];

/// Static inputs of the resolver, built once from configuration.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    base_domain: String,
    base_labels: usize,
    admin_paths: Vec<String>,
}

impl ResolverSettings {
    pub fn new<S: AsRef<str>>(base_domain: &str, admin_paths: &[S]) -> Self {
        let base_domain = strip_port(base_domain.trim())
            .trim_end_matches('.')
            .to_ascii_lowercase();
        let base_labels = base_domain.split('.').filter(|l| !l.is_empty()).count();
        Self {
            base_domain,
            base_labels,
            admin_paths: admin_paths
                .iter()
                .map(|p| p.as_ref().trim_matches('/').to_ascii_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    pub fn base_labels(&self) -> usize {
        self.base_labels
    }
}

/// The request facts the resolver looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessRequest<'a> {
    pub host: Option<&'a str>,
    pub explicit_subdomain: Option<&'a str>,
    pub path: &'a str,
}

/// How a request should be served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessRoute {
    /// Dashboard route; identity comes from the bearer token only.
    AdminSession,
    /// Tenant picked by subdomain, optionally personalised for a guest.
    PublicBySubdomain {
        subdomain: String,
        guest_id: Option<Uuid>,
    },
    /// Base-domain link carrying only a guest id.
    PublicByGuestLegacy { guest_id: Uuid },
    NotFound,
}

/// What the path says about a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestSegment {
    None,
    Valid(Uuid),
    Malformed,
}

/// Classifies a request.
pub fn classify(settings: &ResolverSettings, request: &AccessRequest<'_>) -> AccessRoute {
    if is_admin_path(settings, request.path) {
        return AccessRoute::AdminSession;
    }

    let subdomain = candidate_subdomain(settings, request.host, request.explicit_subdomain);

    match (subdomain, parse_guest_segment(request.path)) {
        (_, GuestSegment::Malformed) => AccessRoute::NotFound,
        (Some(subdomain), GuestSegment::None) => AccessRoute::PublicBySubdomain {
            subdomain,
            guest_id: None,
        },
        (Some(subdomain), GuestSegment::Valid(id)) => AccessRoute::PublicBySubdomain {
            subdomain,
            guest_id: Some(id),
        },
        (None, GuestSegment::Valid(guest_id)) => AccessRoute::PublicByGuestLegacy { guest_id },
        (None, GuestSegment::None) => AccessRoute::NotFound,
    }
}

/// Picks the tenant subdomain for a request.
///
/// A valid explicit value wins; an invalid or reserved one is ignored and the
/// host is consulted instead.
pub fn candidate_subdomain(
    settings: &ResolverSettings,
    host: Option<&str>,
    explicit: Option<&str>,
) -> Option<String> {
    explicit
        .and_then(|value| parse_subdomain(value).ok())
        .or_else(|| host.and_then(|h| subdomain_from_host(h, settings.base_labels)))
}

/// Extracts the first label of `host` when it has more labels than the base
/// domain.
pub fn subdomain_from_host(host: &str, base_labels: usize) -> Option<String> {
    let host = host.trim();
    if host.is_empty() || host.starts_with('[') {
        return None;
    }

    let host = strip_port(host).trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').collect();

    if labels.iter().any(|l| l.is_empty()) || labels.len() < base_labels + 1 {
        return None;
    }

    // Dotted IPv4 literals have enough labels but no tenant.
    if labels.iter().all(|l| l.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    parse_subdomain(labels[0]).ok()
}

/// True when the first path segment names a dashboard route.
pub fn is_admin_path(settings: &ResolverSettings, path: &str) -> bool {
    path_segments(path)
        .first()
        .map(|first| {
            let first = first.to_ascii_lowercase();
            settings.admin_paths.iter().any(|p| *p == first)
        })
        .unwrap_or(false)
}

/// Reads the guest id from `/{id}` or `/public/{id}`.
pub fn parse_guest_segment(path: &str) -> GuestSegment {
    let segments = path_segments(path);
    let candidate = match segments.as_slice() {
        [] => return GuestSegment::None,
        [prefix] if prefix.eq_ignore_ascii_case(PUBLIC_PATH_PREFIX) => return GuestSegment::None,
        [id] => *id,
        [prefix, id] if prefix.eq_ignore_ascii_case(PUBLIC_PATH_PREFIX) => *id,
        _ => return GuestSegment::Malformed,
    };

    match Uuid::parse_str(candidate) {
        Ok(id) => GuestSegment::Valid(id),
        Err(_) => GuestSegment::Malformed,
    }
}

fn path_segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "thiepcuoi.example.com";

    fn settings() -> ResolverSettings {
        ResolverSettings::new(BASE, DEFAULT_ADMIN_PATHS)
    }

    fn request<'a>(host: &'a str, explicit: Option<&'a str>, path: &'a str) -> AccessRequest<'a> {
        AccessRequest {
            host: Some(host),
            explicit_subdomain: explicit,
            path,
        }
    }

    #[test]
    fn test_settings_count_labels() {
        assert_eq!(settings().base_labels(), 3);
        assert_eq!(ResolverSettings::new("localhost:3000", DEFAULT_ADMIN_PATHS).base_labels(), 1);
        assert_eq!(ResolverSettings::new("Example.COM.", DEFAULT_ADMIN_PATHS).base_domain(), "example.com");
    }

    #[test]
    fn test_subdomain_requires_extra_label() {
        assert_eq!(subdomain_from_host("thiepcuoi.example.com", 3), None);
        assert_eq!(subdomain_from_host("example.com", 3), None);
        assert_eq!(
            subdomain_from_host("nguyen-van-a.thiepcuoi.example.com", 3),
            Some("nguyen-van-a".to_string())
        );
    }

    #[test]
    fn test_subdomain_strips_port_and_case() {
        assert_eq!(
            subdomain_from_host("Nguyen-Van-A.Thiepcuoi.Example.com:8443", 3),
            Some("nguyen-van-a".to_string())
        );
        assert_eq!(
            subdomain_from_host("couple.localhost:3000", 1),
            Some("couple".to_string())
        );
        assert_eq!(
            subdomain_from_host("couple.thiepcuoi.example.com.", 3),
            Some("couple".to_string())
        );
    }

    #[test]
    fn test_subdomain_ignores_reserved_and_ip() {
        assert_eq!(subdomain_from_host("www.thiepcuoi.example.com", 3), None);
        assert_eq!(subdomain_from_host("API.thiepcuoi.example.com", 3), None);
        assert_eq!(subdomain_from_host("192.168.100.200", 3), None);
        assert_eq!(subdomain_from_host("[::1]:8080", 1), None);
        assert_eq!(subdomain_from_host("a.thiepcuoi.example.com", 3), None);
    }

    #[test]
    fn test_explicit_header_wins() {
        let s = settings();
        assert_eq!(
            candidate_subdomain(&s, Some("tran-b.thiepcuoi.example.com"), Some("nguyen-van-a")),
            Some("nguyen-van-a".to_string())
        );
    }

    #[test]
    fn test_invalid_explicit_header_falls_back_to_host() {
        let s = settings();
        assert_eq!(
            candidate_subdomain(&s, Some("tran-b.thiepcuoi.example.com"), Some("www")),
            Some("tran-b".to_string())
        );
        assert_eq!(candidate_subdomain(&s, Some(BASE), Some("not valid!")), None);
    }

    #[test]
    fn test_admin_paths_ignore_subdomain() {
        let s = settings();
        for path in ["/login", "/dashboard", "/dashboard/guests", "/edit/intro", "/Preview"] {
            let req = request("nguyen-van-a.thiepcuoi.example.com", None, path);
            assert_eq!(classify(&s, &req), AccessRoute::AdminSession, "{path}");
        }
    }

    #[test]
    fn test_subdomain_without_guest() {
        let req = request("nguyen-van-a.thiepcuoi.example.com", None, "/");
        assert_eq!(
            classify(&settings(), &req),
            AccessRoute::PublicBySubdomain {
                subdomain: "nguyen-van-a".to_string(),
                guest_id: None
            }
        );
    }

    #[test]
    fn test_subdomain_with_guest() {
        let id = Uuid::new_v4();
        let path = format!("/{}", id);
        let req = request("nguyen-van-a.thiepcuoi.example.com", None, &path);
        assert_eq!(
            classify(&settings(), &req),
            AccessRoute::PublicBySubdomain {
                subdomain: "nguyen-van-a".to_string(),
                guest_id: Some(id)
            }
        );
    }

    #[test]
    fn test_legacy_guest_paths() {
        let id = Uuid::new_v4();
        for path in [format!("/{}", id), format!("/public/{}", id), format!("/{}?ref=zalo", id)] {
            let req = request(BASE, None, &path);
            assert_eq!(
                classify(&settings(), &req),
                AccessRoute::PublicByGuestLegacy { guest_id: id },
                "{path}"
            );
        }
    }

    #[test]
    fn test_nothing_to_resolve() {
        let req = request(BASE, None, "/");
        assert_eq!(classify(&settings(), &req), AccessRoute::NotFound);
        let no_host = AccessRequest {
            path: "/",
            ..Default::default()
        };
        assert_eq!(classify(&settings(), &no_host), AccessRoute::NotFound);
    }

    #[test]
    fn test_malformed_guest_segment() {
        let s = settings();
        for path in ["/not-a-uuid", "/public/123", "/a/b/c"] {
            let req = request("nguyen-van-a.thiepcuoi.example.com", None, path);
            assert_eq!(classify(&s, &req), AccessRoute::NotFound, "{path}");
            let req = request(BASE, None, path);
            assert_eq!(classify(&s, &req), AccessRoute::NotFound, "{path}");
        }
    }

    #[test]
    fn test_parse_guest_segment() {
        let id = Uuid::new_v4();
        assert_eq!(parse_guest_segment(""), GuestSegment::None);
        assert_eq!(parse_guest_segment("/public"), GuestSegment::None);
        assert_eq!(parse_guest_segment(&format!("{}/", id)), GuestSegment::Valid(id));
        assert_eq!(parse_guest_segment("/x"), GuestSegment::Malformed);
    }

    #[test]
    fn test_route_serializes_with_kind() {
        let json = serde_json::to_value(AccessRoute::AdminSession).unwrap();
        assert_eq!(json["kind"], "admin_session");
    }
}
