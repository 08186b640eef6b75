//! Integration tests for public landing pages and attendance confirmation.

mod common;

use axum::http::{Method, StatusCode};
use axum::{body::Body, extract::ConnectInfo, http::Request};
use common::{
    create_account, create_guest, create_intro, get_request_with_auth, request_for_host, send,
    setup, setup_with_config, tenant_host, test_config, unique_subdomain, TestAccount,
    BASE_DOMAIN,
};
use std::net::SocketAddr;
use domain::models::AccountRole;
use serde_json::Value;
use sqlx::PgPool;

/// An owner with a subdomain, one intro and one guest.
struct Tenant {
    owner: TestAccount,
    subdomain: String,
    intro_id: String,
    guest_id: String,
}

async fn tenant(app: &axum::Router, pool: &PgPool, guest_name: &str) -> Tenant {
    let subdomain = unique_subdomain();
    let owner = create_account(app, pool, AccountRole::Owner, 1, Some(&subdomain)).await;
    let intro = create_intro(app, &owner).await;
    let intro_id = intro["id"].as_str().unwrap().to_string();
    let guest = create_guest(app, &owner, &intro_id, guest_name).await;

    Tenant {
        guest_id: guest["id"].as_str().unwrap().to_string(),
        owner,
        subdomain,
        intro_id,
    }
}

async fn confirm_by_subdomain(app: &axum::Router, tenant: &Tenant, guest_id: &str) -> (StatusCode, Value) {
    send(
        app,
        request_for_host(
            Method::POST,
            &format!("/api/v1/landing/by-subdomain/{}/confirm", guest_id),
            &tenant_host(&tenant.subdomain),
        ),
    )
    .await
}

async fn stats(app: &axum::Router, tenant: &Tenant) -> Value {
    let (status, json) = send(
        app,
        get_request_with_auth(
            &format!("/api/v1/intros/{}/stats", tenant.intro_id),
            &tenant.owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json
}

#[tokio::test]
async fn test_guest_link_confirm_is_idempotent() {
    let (app, pool) = setup().await;
    let t = tenant(&app, &pool, "Nguyen Van A").await;

    let (status, page) = send(
        &app,
        request_for_host(
            Method::GET,
            &format!("/api/v1/landing/by-subdomain/{}", t.guest_id),
            &tenant_host(&t.subdomain),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", page);
    assert_eq!(page["intro"]["id"], t.intro_id.as_str());
    assert_eq!(page["guest"]["name"], "Nguyen Van A");
    assert_eq!(page["guest"]["confirmed"], false);

    let (status, first) = confirm_by_subdomain(&app, &t, &t.guest_id).await;
    assert_eq!(status, StatusCode::OK, "{}", first);
    assert_eq!(first["already_confirmed"], false);
    assert_eq!(first["guest"]["confirmed"], true);
    assert_eq!(stats(&app, &t).await["confirmed"], 1);

    let (status, second) = confirm_by_subdomain(&app, &t, &t.guest_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["already_confirmed"], true);
    assert_eq!(second["guest"]["confirmed"], true);
    assert_eq!(stats(&app, &t).await["confirmed"], 1);
}

#[tokio::test]
async fn test_other_tenants_guest_is_not_found_under_subdomain() {
    let (app, pool) = setup().await;
    let first = tenant(&app, &pool, "Guest One").await;
    let second = tenant(&app, &pool, "Guest Two").await;

    let (status, json) = send(
        &app,
        request_for_host(
            Method::GET,
            &format!("/api/v1/landing/by-subdomain/{}", second.guest_id),
            &tenant_host(&first.subdomain),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Invitation not found");

    // Confirming across tenants must not touch the guest.
    let (status, _) = confirm_by_subdomain(&app, &first, &second.guest_id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(stats(&app, &second).await["confirmed"], 0);
}

#[tokio::test]
async fn test_subdomain_landing_without_guest() {
    let (app, pool) = setup().await;
    let t = tenant(&app, &pool, "Guest").await;

    let (status, page) = send(
        &app,
        request_for_host(
            Method::GET,
            "/api/v1/landing/by-subdomain",
            &format!("{}:443", tenant_host(&t.subdomain.to_uppercase())),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", page);
    assert_eq!(page["intro"]["id"], t.intro_id.as_str());
    assert!(page["guest"].is_null());
    assert!(page["header_section"].is_object());
    assert!(page["album_sessions"].is_array());
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_invitation_not_found() {
    let (app, pool) = setup().await;
    let t = tenant(&app, &pool, "Guest").await;

    for path in [
        format!("/api/v1/landing/by-subdomain/{}", uuid::Uuid::new_v4()),
        "/api/v1/landing/by-subdomain/not-a-uuid".to_string(),
    ] {
        let (status, json) = send(
            &app,
            request_for_host(Method::GET, &path, &tenant_host(&t.subdomain)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(json["message"], "Invitation not found");
    }

    let (status, json) = send(
        &app,
        request_for_host(
            Method::GET,
            &format!("/api/v1/landing/public/{}", uuid::Uuid::new_v4()),
            common::BASE_DOMAIN,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Invitation not found");
}

#[tokio::test]
async fn test_base_domain_guest_link() {
    let (app, pool) = setup().await;
    let t = tenant(&app, &pool, "Le Van C").await;

    let (status, page) = send(
        &app,
        request_for_host(
            Method::GET,
            &format!("/api/v1/landing/public/{}", t.guest_id),
            common::BASE_DOMAIN,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", page);
    assert_eq!(page["guest"]["name"], "Le Van C");
    assert_eq!(page["intro"]["id"], t.intro_id.as_str());

    let (status, outcome) = send(
        &app,
        request_for_host(
            Method::POST,
            &format!("/api/v1/landing/public/{}/confirm", t.guest_id),
            common::BASE_DOMAIN,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["already_confirmed"], false);
    assert_eq!(stats(&app, &t).await["confirmed"], 1);
}

#[tokio::test]
async fn test_disabled_account_hides_its_invitations() {
    let (app, pool) = setup().await;
    let t = tenant(&app, &pool, "Guest").await;

    sqlx::query("UPDATE accounts SET is_active = false WHERE id = $1::uuid")
        .bind(&t.owner.id)
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        request_for_host(Method::GET, "/api/v1/landing/by-subdomain", &tenant_host(&t.subdomain)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request_for_host(
            Method::GET,
            &format!("/api/v1/landing/public/{}", t.guest_id),
            common::BASE_DOMAIN,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_preview_shows_seed_guest() {
    let (app, pool) = setup().await;
    let t = tenant(&app, &pool, "Real Guest").await;

    let (status, page) = send(
        &app,
        get_request_with_auth(
            &format!("/api/v1/intros/{}/preview", t.intro_id),
            &t.owner.access_token,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["guest"]["name"], "Demo Guest");
    assert_eq!(page["guest"]["user_relationship"], "Demo");
}

/// Public landing request from socket `peer` claiming `forwarded_for`.
fn landing_from(peer: &str, forwarded_for: &str) -> Request<Body> {
    let mut request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/v1/landing/public/{}", uuid::Uuid::new_v4()))
        .header("host", BASE_DOMAIN)
        .header("x-forwarded-for", forwarded_for)
        .body(Body::empty())
        .unwrap();
    let peer: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

#[tokio::test]
async fn test_spoofed_forwarded_for_does_not_reset_quota() {
    let mut config = test_config();
    config.security.rate_limit_per_minute = 1;
    let (app, _pool) = setup_with_config(config).await;

    let mut statuses = Vec::new();
    for i in 1..=5 {
        let (status, _) = send(&app, landing_from("192.0.2.10:40000", &format!("10.0.0.{}", i))).await;
        statuses.push(status);
    }

    assert_eq!(statuses[0], StatusCode::NOT_FOUND);
    assert!(statuses[1..]
        .iter()
        .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_trusted_proxy_limits_each_forwarded_client() {
    let mut config = test_config();
    config.security.rate_limit_per_minute = 1;
    config.security.trusted_proxies = vec!["10.1.1.1".parse().unwrap()];
    let (app, _pool) = setup_with_config(config).await;

    let (first, _) = send(&app, landing_from("10.1.1.1:40000", "198.51.100.1")).await;
    let (repeat, _) = send(&app, landing_from("10.1.1.1:40001", "198.51.100.1")).await;
    let (other, _) = send(&app, landing_from("10.1.1.1:40002", "198.51.100.2")).await;

    assert_eq!(first, StatusCode::NOT_FOUND);
    assert_eq!(repeat, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(other, StatusCode::NOT_FOUND);
}
