//! Integration tests for subdomain assignment and request resolution.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{
    create_account, create_guest, create_intro, create_owner, get_request_with_auth,
    json_request_with_auth, request_for_host, send, setup, tenant_host, unique_subdomain,
    BASE_DOMAIN,
};
use domain::models::AccountRole;
use serde_json::json;

async fn put_subdomain(
    app: &axum::Router,
    token: &str,
    subdomain: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        json_request_with_auth(
            Method::PUT,
            "/api/v1/me/subdomain",
            json!({ "subdomain": subdomain }),
            token,
        ),
    )
    .await
}

#[tokio::test]
async fn test_set_subdomain_normalizes_and_previews_link() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;
    let subdomain = unique_subdomain();

    let (status, json) = put_subdomain(
        &app,
        &owner.access_token,
        json!(format!("  {}  ", subdomain.to_uppercase())),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["subdomain"], subdomain.as_str());
    assert_eq!(
        json["guest_url_preview"],
        format!(
            "https://{}.{}/00000000-0000-0000-0000-000000000000",
            subdomain, BASE_DOMAIN
        )
    );

    let (status, json) = send(
        &app,
        get_request_with_auth("/api/v1/me/subdomain", &owner.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["subdomain"], subdomain.as_str());
}

#[tokio::test]
async fn test_clear_subdomain() {
    let (app, pool) = setup().await;
    let subdomain = unique_subdomain();
    let owner = create_account(&app, &pool, AccountRole::Owner, 1, Some(&subdomain)).await;

    let (status, json) = put_subdomain(&app, &owner.access_token, json!(null)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["subdomain"].is_null());
    assert!(json["guest_url_preview"]
        .as_str()
        .unwrap()
        .starts_with(&format!("https://{}/", BASE_DOMAIN)));
}

#[tokio::test]
async fn test_reserved_subdomain_is_conflict() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;

    for reserved in ["www", "API", "admin"] {
        let (status, json) = put_subdomain(&app, &owner.access_token, json!(reserved)).await;
        assert_eq!(status, StatusCode::CONFLICT, "{} -> {}", reserved, json);
    }
}

#[tokio::test]
async fn test_malformed_subdomain_is_validation_error() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;

    for bad in ["ab", "-leading", "trailing-", "under_score", "dot.ted"] {
        let (status, _) = put_subdomain(&app, &owner.access_token, json!(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", bad);
    }
}

#[tokio::test]
async fn test_subdomain_taken_by_another_account_is_conflict() {
    let (app, pool) = setup().await;
    let subdomain = unique_subdomain();
    create_account(&app, &pool, AccountRole::Owner, 1, Some(&subdomain)).await;
    let other = create_owner(&app, &pool).await;

    let (status, _) = put_subdomain(&app, &other.access_token, json!(subdomain.to_uppercase())).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reassigning_own_subdomain_is_allowed() {
    let (app, pool) = setup().await;
    let subdomain = unique_subdomain();
    let owner = create_account(&app, &pool, AccountRole::Owner, 1, Some(&subdomain)).await;

    let (status, _) = put_subdomain(&app, &owner.access_token, json!(subdomain)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_claims_of_one_subdomain_admit_one() {
    let (app, pool) = setup().await;
    let first = create_owner(&app, &pool).await;
    let second = create_owner(&app, &pool).await;
    let subdomain = unique_subdomain();

    let ((a, _), (b, _)) = tokio::join!(
        put_subdomain(&app, &first.access_token, json!(subdomain)),
        put_subdomain(&app, &second.access_token, json!(subdomain)),
    );

    let mut statuses = [a, b];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn test_resolve_admin_path_requires_token() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;

    let (status, _) = send(
        &app,
        request_for_host(Method::GET, "/api/v1/resolve?path=/dashboard", BASE_DOMAIN),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/resolve?path=/dashboard")
        .header(header::HOST, tenant_host("someone-else"))
        .header(header::AUTHORIZATION, format!("Bearer {}", owner.access_token))
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;

    // The tenant host plays no part in a dashboard route.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["route"]["kind"], "admin_session");
    assert_eq!(json["account"]["id"], owner.id.as_str());
    assert!(json["intros"].is_array());
}

#[tokio::test]
async fn test_resolve_tenant_root_returns_landing_without_guest() {
    let (app, pool) = setup().await;
    let subdomain = unique_subdomain();
    let owner = create_account(&app, &pool, AccountRole::Owner, 1, Some(&subdomain)).await;
    let intro = create_intro(&app, &owner).await;

    let (status, json) = send(
        &app,
        request_for_host(Method::GET, "/api/v1/resolve?path=/", &tenant_host(&subdomain)),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["route"]["kind"], "public_by_subdomain");
    assert_eq!(json["landing"]["intro"]["id"], intro["id"]);
    assert!(json["landing"]["guest"].is_null());
}

#[tokio::test]
async fn test_resolve_explicit_subdomain_header_matches_host() {
    let (app, pool) = setup().await;
    let subdomain = unique_subdomain();
    let owner = create_account(&app, &pool, AccountRole::Owner, 1, Some(&subdomain)).await;
    let intro = create_intro(&app, &owner).await;
    let intro_id = intro["id"].as_str().unwrap();
    let guest = create_guest(&app, &owner, intro_id, "Tran Thi B").await;
    let guest_id = guest["id"].as_str().unwrap();

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/v1/resolve?path=/{}", guest_id))
        .header(header::HOST, BASE_DOMAIN)
        .header("x-subdomain", subdomain.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["landing"]["guest"]["name"], "Tran Thi B");
}

#[tokio::test]
async fn test_resolve_unknown_tenant_is_invitation_not_found() {
    let (app, _pool) = setup().await;

    let (status, json) = send(
        &app,
        request_for_host(
            Method::GET,
            "/api/v1/resolve?path=/",
            &tenant_host(&unique_subdomain()),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Invitation not found");
}

#[tokio::test]
async fn test_resolve_malformed_guest_segment_is_not_found() {
    let (app, _pool) = setup().await;

    let (status, json) = send(
        &app,
        request_for_host(Method::GET, "/api/v1/resolve?path=/not-a-guest", BASE_DOMAIN),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Invitation not found");
}
