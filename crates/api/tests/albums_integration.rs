//! Integration tests for session images, albums and ordering.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_intro, create_owner, delete_request_with_auth, get_request_with_auth,
    json_request_with_auth, send, setup, TestAccount,
};
use serde_json::{json, Value};

async fn upload(app: &axum::Router, owner: &TestAccount, intro_id: &str, name: &str) -> String {
    let (status, json) = send(
        app,
        json_request_with_auth(
            Method::POST,
            &format!("/api/v1/intros/{}/images", intro_id),
            json!({ "url": format!("https://cdn.example.com/{}.jpg", name) }),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    json["id"].as_str().unwrap().to_string()
}

async fn create_album(app: &axum::Router, owner: &TestAccount, intro_id: &str, title: &str) -> Value {
    let (status, json) = send(
        app,
        json_request_with_auth(
            Method::POST,
            &format!("/api/v1/intros/{}/albums", intro_id),
            json!({ "title": title }),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    json
}

async fn add(app: &axum::Router, owner: &TestAccount, album_uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        json_request_with_auth(
            Method::POST,
            &format!("{}/images", album_uri),
            body,
            &owner.access_token,
        ),
    )
    .await
}

/// `(session_image_id, order)` pairs of an image list.
fn sequence(images: &Value) -> Vec<(String, i64)> {
    images
        .as_array()
        .unwrap()
        .iter()
        .map(|i| {
            (
                i["session_image_id"].as_str().unwrap().to_string(),
                i["order"].as_i64().unwrap(),
            )
        })
        .collect()
}

fn orders(images: &Value) -> Vec<i64> {
    sequence(images).into_iter().map(|(_, o)| o).collect()
}

#[tokio::test]
async fn test_album_orders_stay_contiguous() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;
    let intro = create_intro(&app, &owner).await;
    let intro_id = intro["id"].as_str().unwrap();

    let a = upload(&app, &owner, intro_id, "a").await;
    let b = upload(&app, &owner, intro_id, "b").await;
    let c = upload(&app, &owner, intro_id, "c").await;

    let album = create_album(&app, &owner, intro_id, "Pre-wedding").await;
    assert_eq!(album["order"], 1);
    let album_uri = format!("/api/v1/intros/{}/albums/{}", intro_id, album["id"].as_str().unwrap());

    add(&app, &owner, &album_uri, json!({ "session_image_id": a })).await;
    add(&app, &owner, &album_uri, json!({ "session_image_id": b })).await;

    // Insert at the front shifts the rest.
    let (status, images) = add(&app, &owner, &album_uri, json!({ "session_image_id": c, "order": 1 })).await;
    assert_eq!(status, StatusCode::CREATED, "{}", images);
    assert_eq!(
        sequence(&images),
        vec![(c.clone(), 1), (a.clone(), 2), (b.clone(), 3)]
    );

    // A far-away position lands at the end.
    let (_, images) = add(&app, &owner, &album_uri, json!({ "session_image_id": a, "order": 99 })).await;
    assert_eq!(orders(&images), vec![1, 2, 3, 4]);

    // Removing from the middle closes the gap.
    let middle = images[1]["id"].as_str().unwrap().to_string();
    let (status, images) = send(
        &app,
        delete_request_with_auth(&format!("{}/images/{}", album_uri, middle), &owner.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders(&images), vec![1, 2, 3]);

    // Reorder renumbers whatever positions were asked for.
    let ids: Vec<String> = images
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect();
    let (status, reordered) = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &format!("{}/order", album_uri),
            json!({ "image_orders": [
                { "id": ids[2], "order": 10 },
                { "id": ids[0], "order": 20 },
                { "id": ids[1], "order": 30 },
            ]}),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", reordered);
    let reordered_ids: Vec<&str> = reordered
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert_eq!(reordered_ids, vec![ids[2].as_str(), ids[0].as_str(), ids[1].as_str()]);
    assert_eq!(orders(&reordered), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_reorder_rejects_unknown_and_duplicate_ids() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;
    let intro = create_intro(&app, &owner).await;
    let intro_id = intro["id"].as_str().unwrap();
    let image = upload(&app, &owner, intro_id, "only").await;
    let album = create_album(&app, &owner, intro_id, "Album").await;
    let album_uri = format!("/api/v1/intros/{}/albums/{}", intro_id, album["id"].as_str().unwrap());

    let (_, images) = add(&app, &owner, &album_uri, json!({ "session_image_id": image })).await;
    let id = images[0]["id"].as_str().unwrap();

    for body in [
        json!({ "image_orders": [{ "id": uuid::Uuid::new_v4(), "order": 1 }] }),
        json!({ "image_orders": [{ "id": id, "order": 1 }, { "id": id, "order": 2 }] }),
    ] {
        let (status, _) = send(
            &app,
            json_request_with_auth(Method::PUT, &format!("{}/order", album_uri), body, &owner.access_token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_deleting_a_session_renumbers_the_rest() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;
    let intro = create_intro(&app, &owner).await;
    let intro_id = intro["id"].as_str().unwrap();

    let first = create_album(&app, &owner, intro_id, "One").await;
    create_album(&app, &owner, intro_id, "Two").await;
    let third = create_album(&app, &owner, intro_id, "Three").await;
    assert_eq!(third["order"], 3);

    let (status, _) = send(
        &app,
        delete_request_with_auth(
            &format!("/api/v1/intros/{}/albums/{}", intro_id, first["id"].as_str().unwrap()),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, albums) = send(
        &app,
        get_request_with_auth(&format!("/api/v1/intros/{}/albums", intro_id), &owner.access_token),
    )
    .await;
    let summary: Vec<(String, i64)> = albums
        .as_array()
        .unwrap()
        .iter()
        .map(|a| (a["title"].as_str().unwrap().to_string(), a["order"].as_i64().unwrap()))
        .collect();
    assert_eq!(summary, vec![("Two".to_string(), 1), ("Three".to_string(), 2)]);
}

#[tokio::test]
async fn test_image_in_use_cannot_be_deleted() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;
    let intro = create_intro(&app, &owner).await;
    let intro_id = intro["id"].as_str().unwrap();
    let image = upload(&app, &owner, intro_id, "kept").await;
    let album = create_album(&app, &owner, intro_id, "Album").await;
    let album_uri = format!("/api/v1/intros/{}/albums/{}", intro_id, album["id"].as_str().unwrap());
    add(&app, &owner, &album_uri, json!({ "session_image_id": image })).await;

    let (status, json) = send(
        &app,
        delete_request_with_auth(
            &format!("/api/v1/intros/{}/images/{}", intro_id, image),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "referential_conflict");
}

#[tokio::test]
async fn test_images_of_another_intro_are_rejected() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;
    let other = create_owner(&app, &pool).await;
    let intro = create_intro(&app, &owner).await;
    let other_intro = create_intro(&app, &other).await;
    let intro_id = intro["id"].as_str().unwrap();
    let foreign = upload(&app, &other, other_intro["id"].as_str().unwrap(), "foreign").await;

    let album = create_album(&app, &owner, intro_id, "Album").await;
    let album_uri = format!("/api/v1/intros/{}/albums/{}", intro_id, album["id"].as_str().unwrap());
    let (status, _) = add(&app, &owner, &album_uri, json!({ "session_image_id": foreign })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &format!("/api/v1/intros/{}/sections/header", intro_id),
            json!({ "session_image_id": foreign }),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_section_upsert_and_landing_image_urls() {
    let (app, pool) = setup().await;
    let owner = create_owner(&app, &pool).await;
    let intro = create_intro(&app, &owner).await;
    let intro_id = intro["id"].as_str().unwrap();
    let image = upload(&app, &owner, intro_id, "groom").await;

    let (status, header) = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &format!("/api/v1/intros/{}/sections/header", intro_id),
            json!({ "session_image_id": image }),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", header);

    let (status, _) = send(
        &app,
        get_request_with_auth(
            &format!("/api/v1/intros/{}/sections/unknown", intro_id),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, page) = send(
        &app,
        get_request_with_auth(&format!("/api/v1/intros/{}/preview", intro_id), &owner.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        page["header_section"]["session_image_url"],
        "https://cdn.example.com/groom.jpg"
    );
}
