// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and credits API tests against the in-memory store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_get_profile_creates_profile() {
    let (app, state, store) = common::create_test_app();
    let token = common::create_test_jwt("alice", &state.config.jwt_signing_key);

    let response = app.oneshot(get("/api/profile", &token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["credits"], 1000);
    assert_eq!(json["email"], "alice@example.com");
    assert_eq!(json["contactEmail"], "");
    assert_eq!(json["displayName"], "Test User");
    assert_eq!(json["emailVerified"], true);

    assert_eq!(store.snapshot("alice").unwrap().credits, 1000);
}

#[tokio::test]
async fn test_patch_profile_updates_fields() {
    let (app, state, store) = common::create_test_app();
    let token = common::create_test_jwt("bob", &state.config.jwt_signing_key);

    app.clone()
        .oneshot(get("/api/profile", &token))
        .await
        .unwrap();

    let response = app
        .oneshot(send_json(
            "PATCH",
            "/api/profile",
            &token,
            json!({ "displayName": "Bobby", "contactEmail": "bob@work.example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["displayName"], "Bobby");
    assert_eq!(json["credits"], 1000);

    let stored = store.snapshot("bob").unwrap();
    assert_eq!(stored.display_name, "Bobby");
    assert_eq!(stored.contact_email, "bob@work.example.com");
}

#[tokio::test]
async fn test_patch_profile_rejects_invalid_email() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt("carol", &state.config.jwt_signing_key);

    let response = app
        .oneshot(send_json(
            "PATCH",
            "/api/profile",
            &token,
            json!({ "contactEmail": "not an email" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_profile_empty_body_rejected() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt("carol", &state.config.jwt_signing_key);

    let response = app
        .oneshot(send_json("PATCH", "/api/profile", &token, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_before_profile_exists_is_not_found() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt("dave", &state.config.jwt_signing_key);

    let response = app
        .oneshot(send_json(
            "PATCH",
            "/api/profile",
            &token,
            json!({ "displayName": "Dave" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.profiles.cached("dave"), None);
}

#[tokio::test]
async fn test_use_credits_before_profile_exists_is_declined() {
    let (app, state, store) = common::create_test_app();
    let token = common::create_test_jwt("hank", &state.config.jwt_signing_key);

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/credits/use",
            &token,
            json!({ "amount": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["credits"], Value::Null);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_use_and_add_credits() {
    let (app, state, store) = common::create_test_app();
    let token = common::create_test_jwt("erin", &state.config.jwt_signing_key);

    app.clone()
        .oneshot(get("/api/profile", &token))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/credits/use",
            &token,
            json!({ "amount": 300 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["credits"], 700);

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/credits/add",
            &token,
            json!({ "amount": 50 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["credits"], 750);

    assert_eq!(store.snapshot("erin").unwrap().credits, 750);
}

#[tokio::test]
async fn test_use_credits_insufficient_balance() {
    let (app, state, store) = common::create_test_app();
    let token = common::create_test_jwt("frank", &state.config.jwt_signing_key);

    app.clone()
        .oneshot(get("/api/profile", &token))
        .await
        .unwrap();
    let writes = store.write_count();

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/credits/use",
            &token,
            json!({ "amount": 5000 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["credits"], 1000);
    assert_eq!(store.write_count(), writes);
}

#[tokio::test]
async fn test_credit_amount_must_be_positive() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt("gina", &state.config.jwt_signing_key);

    for amount in [0, -10] {
        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/credits/add",
                &token,
                json!({ "amount": amount }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "amount {}", amount);
    }
}

#[tokio::test]
async fn test_chat_screen_composition() {
    let (app, state, _) = common::create_test_app();
    let token = common::create_test_jwt("hana", &state.config.jwt_signing_key);

    let response = app.oneshot(get("/api/screens/chat", &token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["sections"], json!(["my_chats", "chat_detail"]));
}
