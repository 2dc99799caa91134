//! HTTP API tests driving the [`Router`] over the in-memory storage.

use axum::{body::Body, Router};
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use service::{infra::Memory, DeletionPolicy};
use tower::ServiceExt as _;

fn app(deletion: DeletionPolicy) -> Router {
    let config = service::Config {
        deletion,
        ..service::Config::default()
    };
    application::router(application::Service::new(
        config,
        Memory::default().into(),
    ))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if body.is_some() {
        req = req.header(header::CONTENT_TYPE, "application/json");
    }
    let req = req.body(body.map_or_else(Body::empty, Body::from)).unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn user_json(n: usize) -> Value {
    json!({
        "email": format!("user{n}@reqres.in"),
        "first_name": format!("First{n}"),
        "last_name": format!("Last{n}"),
        "avatar": format!("https://reqres.in/img/faces/{n}-image.jpg"),
    })
}

async fn create(app: &Router, n: usize) -> Value {
    let (status, user) = send(
        app,
        Method::POST,
        "/api/users/",
        Some(user_json(n).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{user}");
    user
}

fn ids(page: &Value) -> Vec<i64> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn creates_and_returns_user() {
    let app = app(DeletionPolicy::Strict);

    let created = create(&app, 1).await;
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);

    let mut expected = user_json(1);
    expected["id"] = json!(id);
    assert_eq!(created, expected);

    let (status, first) = get(&app, &format!("/api/users/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, expected);

    let (_, second) = get(&app, &format!("/api/users/{id}")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn keeps_avatar_verbatim() {
    let app = app(DeletionPolicy::Strict);

    let mut user = user_json(1);
    user["avatar"] = json!("http://updated-uri.ru");
    let (status, created) =
        send(&app, Method::POST, "/api/users", Some(user.to_string())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["avatar"], "http://updated-uri.ru");
}

#[tokio::test]
async fn rejects_invalid_create_payload() {
    let app = app(DeletionPolicy::Strict);

    let (status, err) = send(
        &app,
        Method::POST,
        "/api/users/",
        Some(
            json!({
                "email": "not-an-email",
                "first_name": "",
                "avatar": "https://reqres.in/img/faces/1-image.jpg",
            })
            .to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "SCHEMA_INVALID");
    assert_eq!(err["fields"], json!(["email", "first_name", "last_name"]));

    let (status, err) =
        send(&app, Method::POST, "/api/users/", Some("{".to_owned())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "SCHEMA_INVALID");

    let (status, err) = send(
        &app,
        Method::POST,
        "/api/users/",
        Some(json!({"email": 42}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "SCHEMA_INVALID");

    let (_, page) = get(&app, "/api/users/").await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn validates_user_id() {
    let app = app(DeletionPolicy::Strict);
    let created = create(&app, 1).await;
    let next = created["id"].as_i64().unwrap() + 1;

    let (status, err) = get(&app, "/api/users/text").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "MALFORMED");
    assert_eq!(err["fields"], json!(["id"]));

    for id in ["0", "-1", "99999999999999999999"] {
        let (status, err) = get(&app, &format!("/api/users/{id}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "id: {id}");
        assert_eq!(err["code"], "OUT_OF_RANGE", "id: {id}");
    }

    let (status, err) = get(&app, &format!("/api/users/{next}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "USER_NOT_EXISTS");
}

#[tokio::test]
async fn lists_empty_directory() {
    let app = app(DeletionPolicy::Strict);

    let (status, page) = get(&app, "/api/users/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        page,
        json!({"items": [], "total": 0, "page": 1, "size": 50, "pages": 0}),
    );
}

#[tokio::test]
async fn walks_all_pages_exactly_once() {
    let app = app(DeletionPolicy::Strict);
    let mut created = Vec::new();
    for n in 1..=7 {
        created.push(create(&app, n).await["id"].as_i64().unwrap());
    }

    for size in 1..=8 {
        let (_, first) = get(&app, &format!("/api/users?size={size}")).await;
        let pages = first["pages"].as_u64().unwrap();
        assert_eq!(pages, 7_u64.div_ceil(size));

        let mut seen = Vec::new();
        for page in 1..=pages {
            let (status, body) =
                get(&app, &format!("/api/users/?page={page}&size={size}"))
                    .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["total"], 7);

            let items = ids(&body);
            if page < pages {
                assert_eq!(items.len() as u64, size);
            } else {
                assert_eq!(items.len() as u64, 7 - size * (pages - 1));
            }
            seen.extend(items);
        }
        assert_eq!(seen, created, "size: {size}");
    }
}

#[tokio::test]
async fn returns_empty_page_past_the_end() {
    let app = app(DeletionPolicy::Strict);
    for n in 1..=3 {
        _ = create(&app, n).await;
    }

    let (status, page) = get(&app, "/api/users/?page=4&size=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"], json!([]));
    assert_eq!(page["pages"], 3);
    assert_eq!(page["page"], 4);
}

#[tokio::test]
async fn validates_pagination_parameters() {
    let app = app(DeletionPolicy::Strict);

    for (query, code, fields) in [
        ("page=text", "MALFORMED", json!(["page"])),
        ("size=", "MALFORMED", json!(["size"])),
        ("page=0", "OUT_OF_RANGE", json!(["page"])),
        ("size=-5", "OUT_OF_RANGE", json!(["size"])),
        ("size=101", "OUT_OF_RANGE", json!(["size"])),
        ("page=0&size=x", "MALFORMED", json!(["page", "size"])),
    ] {
        let (status, err) = get(&app, &format!("/api/users/?{query}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{query}");
        assert_eq!(err["code"], code, "{query}");
        assert_eq!(err["fields"], fields, "{query}");
    }

    let (status, _) = get(&app, "/api/users/?size=100").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn patches_only_provided_fields() {
    let app = app(DeletionPolicy::Strict);
    let created = create(&app, 1).await;
    let uri = format!("/api/users/{}", created["id"]);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"email": "updated_mail@test.ru"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = created.clone();
    expected["email"] = json!("updated_mail@test.ru");
    assert_eq!(updated, expected);

    let (_, fetched) = get(&app, &uri).await;
    assert_eq!(fetched, expected);

    let (status, unchanged) =
        send(&app, Method::PATCH, &uri, Some("{}".to_owned())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, expected);
}

#[tokio::test]
async fn rejects_invalid_patch() {
    let app = app(DeletionPolicy::Strict);
    let created = create(&app, 1).await;
    let uri = format!("/api/users/{}", created["id"]);

    let (status, err) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"last_name": null, "avatar": "nope"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "SCHEMA_INVALID");
    assert_eq!(err["fields"], json!(["last_name", "avatar"]));

    // Path is validated before the payload.
    let (status, err) = send(
        &app,
        Method::PATCH,
        "/api/users/text",
        Some("not json".to_owned()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "MALFORMED");

    let (status, err) = send(
        &app,
        Method::PATCH,
        "/api/users/1000",
        Some(json!({"first_name": "Ghost"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "USER_NOT_EXISTS");

    let (_, fetched) = get(&app, &uri).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn deletes_user_strictly() {
    let app = app(DeletionPolicy::Strict);
    let first = create(&app, 1).await;
    let second = create(&app, 2).await;
    let uri = format!("/api/users/{}", first["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, err) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "USER_NOT_EXISTS");

    let (_, page) = get(&app, "/api/users/").await;
    assert_eq!(ids(&page), vec![second["id"].as_i64().unwrap()]);

    let third = create(&app, 3).await;
    assert!(third["id"].as_i64() > second["id"].as_i64());

    let (status, err) =
        send(&app, Method::DELETE, "/api/users/0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "OUT_OF_RANGE");
}

#[tokio::test]
async fn deletes_user_idempotently() {
    let app = app(DeletionPolicy::Idempotent);
    let user = create(&app, 1).await;
    let uri = format!("/api/users/{}", user["id"]);

    for _ in 0..2 {
        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reports_status() {
    let app = app(DeletionPolicy::Strict);

    let (status, body) = get(&app, "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"database": true}));
}

#[tokio::test]
async fn serves_users_without_api_prefix() {
    let app = app(DeletionPolicy::Strict);

    let (status, page) = get(&app, "/users/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 0);

    let (status, body) = get(&app, "/users/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_EXISTS");

    let (status, body) = get(&app, "/users/text").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "MALFORMED");

    let (status, created) =
        send(&app, Method::POST, "/users", Some(user_json(1).to_string()))
            .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, same) = get(&app, &format!("/api/users/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same, created);

    let (status, page) = get(&app, "/users?page=1&size=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&page), [id]);
}
