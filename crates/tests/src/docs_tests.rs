use axum::http::StatusCode;
use serde_json::Value;
use utoipa::OpenApi;

use crate::common::{get_anon, test_app};

#[test]
fn openapi_document_lists_every_route() {
    let doc: Value = serde_json::to_value(server::openapi::ApiDoc::openapi()).unwrap();
    let paths = doc["paths"].as_object().unwrap();
    for path in [
        "/detainee/signup",
        "/lawyer/login",
        "/{role}/logout",
        "/auth/refresh",
        "/case/register",
        "/case/{caseid}/history",
        "/case/{entity}/{caseid}/process-case",
        "/detainee/{caseid}/raise-bail",
        "/lawyer/{lawyerid}/ongoing-cases",
        "/judge/bail-decision",
        "/health",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(doc["components"]["securitySchemes"].get("bearer").is_some());
}

#[tokio::test]
async fn docs_page_is_served_without_auth() {
    let (app, _pool) = test_app().await;
    let (status, _) = get_anon(&app, "/docs").await;
    assert_eq!(status, StatusCode::OK);
}
