//! Per-client-address rate limiting for the public landing routes.
//!
//! Guest ids are the only credential a landing page needs, so the public
//! routes are throttled per address to slow down id enumeration.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use serde_json::json;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
};

use crate::app::AppState;

/// Above this many tracked addresses, idle entries are dropped.
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Keyed limiter shared by all public requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    rate_limit_per_minute: u32,
    trusted_proxies: Vec<IpAddr>,
}

impl RateLimiterState {
    /// A limiter allowing `rate_limit_per_minute` requests per address. Zero
    /// is treated as one. Forwarded headers are only read from
    /// `trusted_proxies`.
    pub fn new(rate_limit_per_minute: u32, trusted_proxies: Vec<IpAddr>) -> Self {
        let per_minute = NonZeroU32::new(rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            rate_limit_per_minute,
            trusted_proxies,
        }
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    pub fn trusted_proxies(&self) -> &[IpAddr] {
        &self.trusted_proxies
    }

    /// `Err` carries the retry-after delay in whole seconds.
    pub fn check(&self, client: IpAddr) -> Result<(), u64> {
        if self.limiter.len() > MAX_TRACKED_CLIENTS {
            self.limiter.retain_recent();
        }
        self.limiter.check_key(&client).map_err(|not_until| {
            not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs()
                .max(1)
        })
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

/// Client address for rate limiting.
///
/// The socket peer, unless it is a trusted proxy. Then `X-Forwarded-For` is
/// walked from the right and the first hop that is not a trusted proxy wins.
/// Hops left of an unparseable entry are never believed.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trusted: &[IpAddr]) -> IpAddr {
    let mut client = peer
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !trusted.contains(&client) {
        return client;
    }

    let hops = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .collect::<Vec<_>>();

    for hop in hops.iter().rev() {
        match hop.parse::<IpAddr>() {
            Ok(addr) => {
                client = addr;
                if !trusted.contains(&addr) {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    client
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(ref rate_limiter) = state.rate_limiter {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let client = client_ip(req.headers(), peer, rate_limiter.trusted_proxies());

        if let Err(retry_after) = rate_limiter.check(client) {
            tracing::warn!(client = %client, retry_after, "Public rate limit exceeded");
            return rate_limited_response(rate_limiter.rate_limit_per_minute(), retry_after);
        }
    }

    next.run(req).await
}

fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retry_after": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_rate_limiter_allows_within_quota() {
        let state = RateLimiterState::new(5, vec![]);
        for i in 0..5 {
            assert!(state.check(ip(1)).is_ok(), "Request {} should be allowed", i);
        }
        let retry_after = state.check(ip(1)).unwrap_err();
        assert!(retry_after >= 1);
    }

    #[test]
    fn test_rate_limiter_clients_independent() {
        let state = RateLimiterState::new(1, vec![]);
        assert!(state.check(ip(1)).is_ok());
        assert!(state.check(ip(2)).is_ok());
        assert!(state.check(ip(1)).is_err());
        assert!(state.check(ip(2)).is_err());
        assert!(state.check(ip(3)).is_ok());
    }

    #[test]
    fn test_zero_limit_is_one() {
        let state = RateLimiterState::new(0, vec![]);
        assert!(state.check(ip(1)).is_ok());
        assert!(state.check(ip(1)).is_err());
    }

    fn peer(addr: &str) -> Option<SocketAddr> {
        Some(addr.parse().unwrap())
    }

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_forwarded_for_ignored_without_trusted_proxies() {
        let headers = forwarded("203.0.113.7");
        assert_eq!(
            client_ip(&headers, peer("192.0.2.1:5000"), &[]),
            "192.0.2.1".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            client_ip(&HeaderMap::new(), None, &[]),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }

    #[test]
    fn test_forwarded_for_ignored_from_untrusted_peer() {
        let trusted: Vec<IpAddr> = vec!["10.0.0.1".parse().unwrap()];
        let headers = forwarded("203.0.113.7");
        assert_eq!(
            client_ip(&headers, peer("192.0.2.1:5000"), &trusted),
            "192.0.2.1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_rightmost_untrusted_hop_behind_trusted_proxy() {
        let trusted: Vec<IpAddr> = vec!["10.0.0.1".parse().unwrap(), "10.0.0.2".parse().unwrap()];
        // The left-most entry is whatever the client sent.
        let headers = forwarded("6.6.6.6, 198.51.100.9, 10.0.0.2");
        assert_eq!(
            client_ip(&headers, peer("10.0.0.1:443"), &trusted),
            "198.51.100.9".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_garbage_hop_stops_the_walk() {
        let trusted: Vec<IpAddr> = vec!["10.0.0.1".parse().unwrap()];
        let headers = forwarded("198.51.100.9, not-an-ip");
        assert_eq!(
            client_ip(&headers, peer("10.0.0.1:443"), &trusted),
            "10.0.0.1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_rotating_forwarded_for_shares_one_quota() {
        let state = RateLimiterState::new(1, vec![]);
        let client = peer("192.0.2.1:5000");

        let first = client_ip(&forwarded("10.0.0.1"), client, state.trusted_proxies());
        let second = client_ip(&forwarded("10.0.0.2"), client, state.trusted_proxies());
        assert!(state.check(first).is_ok());
        assert!(state.check(second).is_err());
    }

    #[test]
    fn test_rate_limited_response_format() {
        let response = rate_limited_response(100, 60);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");
    }
}
