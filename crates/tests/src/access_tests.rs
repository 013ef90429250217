use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Duration;
use serde_json::json;
use shared_types::UserRole;

use crate::common::{
    file_test_app, get_anon, get_authed, patch_authed, post_json_authed, seed_case, send,
    signup_detainee, signup_judge, test_app, test_config, TEST_SECRET,
};

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let (app, _pool) = test_app().await;
    let (status, body) = get_anon(&app, "/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "Unauthorized");
}

#[tokio::test]
async fn expired_token_is_401_and_garbage_token_is_403() {
    let (app, _pool) = test_app().await;

    let expired = server::auth::jwt::create_token(
        TEST_SECRET,
        1,
        "asha@detainee.test",
        "asha",
        UserRole::Detainee,
        Duration::seconds(-60),
    )
    .unwrap();
    let (status, body) = get_authed(&app, "/auth/me", &expired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");

    let (status, body) = get_authed(&app, "/auth/me", "not-a-token").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let (app, _pool) = test_app().await;
    let forged = server::auth::jwt::create_token(
        "some-other-secret",
        1,
        "jrao@court.test",
        "jrao",
        UserRole::Judge,
        Duration::hours(1),
    )
    .unwrap();
    let (status, _) = get_authed(&app, "/judge/cases/jrao", &forged).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_role_is_403() {
    let (app, _pool) = test_app().await;
    let detainee = signup_detainee(&app, "asha").await;

    let (status, body) = get_authed(&app, "/judge/cases/asha", &detainee).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "Forbidden");

    let (status, _) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &json!({ "caseId": "C-1", "status": "Accepted" }),
        &detainee,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn detainee_cannot_register_cases() {
    let (app, _pool) = test_app().await;
    let detainee = signup_detainee(&app, "asha").await;
    let (status, _) = post_json_authed(&app, "/case/register", &json!({}), &detainee).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn stale_token_does_not_block_public_routes() {
    let (app, _pool) = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/detainee/signup")
        .header(header::AUTHORIZATION, "Bearer stale.garbage.token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "name": "Asha", "address": "Pune", "email": "asha@example.com",
                "username": "asha", "password": "password123",
            })
            .to_string(),
        ))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn token_cookie_authenticates_without_header() {
    let (app, _pool) = test_app().await;
    let token = signup_judge(&app, "jrao", 7001).await;

    let req = Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header(header::COOKIE, format!("theme=dark; token={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "jrao");
}

#[tokio::test]
async fn health_is_public() {
    let (app, _pool) = test_app().await;
    let (status, body) = get_anon(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"]["reachable"], true);
    assert_eq!(body["store"]["journal_mode"], "memory");
    assert_eq!(body["store"]["open_bail_applications"], 0);
    assert_eq!(body["ai_service"], "http://127.0.0.1:5001");
}

#[tokio::test]
async fn health_reports_wal_and_open_applications_on_a_file_store() {
    let (app, _pool, _dir) = file_test_app(test_config()).await;
    let parties = seed_case(&app, "C-100").await;
    patch_authed(&app, "/detainee/C-100/raise-bail", &parties.detainee).await;

    let (status, body) = get_anon(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"]["journal_mode"], "wal");
    assert_eq!(body["store"]["open_bail_applications"], 1);
}
