use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{
    get_authed, post_json, send_with_headers, signup_detainee, signup_judge, signup_lawyer,
    test_app,
};

#[tokio::test]
async fn detainee_signup_returns_user_token_and_cookie() {
    let (app, _pool) = test_app().await;

    let req = Request::builder()
        .method("POST")
        .uri("/detainee/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "name": "Asha Patil",
                "address": "Pune",
                "email": "asha@example.com",
                "username": "asha",
                "password": "password123",
            })
            .to_string(),
        ))
        .unwrap();
    let (status, headers, body) = send_with_headers(&app, req).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Detainee registered successfully");
    assert_eq!(body["user"]["username"], "asha");
    assert_eq!(body["user"]["type"], "detainee");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());

    let cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    let token = body["token"].as_str().unwrap();
    assert!(cookie.starts_with(&format!("token={token}")));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn duplicate_email_and_username_are_rejected_per_role() {
    let (app, _pool) = test_app().await;
    signup_detainee(&app, "asha").await;

    let (status, body) = post_json(
        &app,
        "/detainee/signup",
        &json!({
            "name": "Other", "address": "Pune", "email": "asha@detainee.test",
            "username": "someone", "password": "password123",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered!");

    let (status, body) = post_json(
        &app,
        "/detainee/signup",
        &json!({
            "name": "Other", "address": "Pune", "email": "other@detainee.test",
            "username": "asha", "password": "password123",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already registered!");

    // Accounts of different roles live in separate tables.
    signup_lawyer(&app, "asha", 501).await;
}

#[tokio::test]
async fn duplicate_lawyer_id_is_rejected() {
    let (app, _pool) = test_app().await;
    signup_lawyer(&app, "rmehta", 501).await;

    let (status, body) = post_json(
        &app,
        "/lawyer/signup",
        &json!({
            "name": "Adv. Other", "lawyerId": 501, "address": "Pune",
            "email": "other@bar.test", "username": "other", "password": "password123",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Lawyer ID already registered!");
}

#[tokio::test]
async fn signup_validation_reports_field_errors() {
    let (app, _pool) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/judge/signup",
        &json!({
            "name": "Justice Rao", "judgeId": 7, "address": "Delhi",
            "email": "not-an-email", "username": "jrao", "password": "123",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "ValidationError");
    assert!(body["field_errors"].get("email").is_some());
    assert!(body["field_errors"].get("password").is_some());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (app, _pool) = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/lawyer/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, _headers, body) = send_with_headers(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "BadRequest");
}

#[tokio::test]
async fn detainee_login_by_email_or_username() {
    let (app, _pool) = test_app().await;
    signup_detainee(&app, "asha").await;

    for identifier in ["asha", "asha@detainee.test"] {
        let (status, body) = post_json(
            &app,
            "/detainee/login",
            &json!({ "emailOrUsername": identifier, "password": "password123" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login as {identifier}");
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user"]["username"], "asha");
    }
}

#[tokio::test]
async fn lawyer_login_accepts_numeric_id() {
    let (app, _pool) = test_app().await;
    signup_lawyer(&app, "rmehta", 501).await;

    let (status, body) = post_json(
        &app,
        "/lawyer/login",
        &json!({ "usernameOrLawyerId": 501, "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["lawyerId"], 501);
}

#[tokio::test]
async fn judge_login_by_username_or_id_string() {
    let (app, _pool) = test_app().await;
    signup_judge(&app, "jrao", 7001).await;

    for identifier in [json!("jrao"), json!("7001")] {
        let (status, body) = post_json(
            &app,
            "/judge/login",
            &json!({ "judgeIdOrUsername": identifier, "password": "password123" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["judgeId"], 7001);
    }
}

#[tokio::test]
async fn login_failures_distinguish_unknown_user_and_bad_password() {
    let (app, _pool) = test_app().await;
    signup_judge(&app, "jrao", 7001).await;

    let (status, body) = post_json(
        &app,
        "/judge/login",
        &json!({ "judgeIdOrUsername": "nobody", "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Judge not found");

    let (status, body) = post_json(
        &app,
        "/judge/login",
        &json!({ "judgeIdOrUsername": "jrao", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = post_json(
        &app,
        "/judge/login",
        &json!({ "judgeIdOrUsername": "  ", "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_and_refresh_reflect_token_claims() {
    let (app, _pool) = test_app().await;
    let token = signup_lawyer(&app, "rmehta", 501).await;

    let (status, me) = get_authed(&app, "/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], 501);
    assert_eq!(me["username"], "rmehta");
    assert_eq!(me["type"], "lawyer");

    let (status, refreshed) = get_authed(&app, "/auth/refresh", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["user"]["username"], "rmehta");
    let fresh = refreshed["token"].as_str().unwrap();
    let (status, _) = get_authed(&app, "/auth/me", fresh).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let (app, _pool) = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/judge/logout")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send_with_headers(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
    let cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));
}
