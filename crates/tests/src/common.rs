use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use shared_types::AppConfig;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests";

/// Config for an isolated in-memory database.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config
}

/// Build the full router (auth middleware included) over a fresh in-memory
/// database. Every call gets its own database, so tests never share rows.
pub async fn test_app() -> (Router, SqlitePool) {
    test_app_with(test_config()).await
}

pub async fn test_app_with(config: AppConfig) -> (Router, SqlitePool) {
    let pool = server::db::create_pool(&config.database)
        .await
        .expect("Failed to open database");
    server::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = server::db::AppState::new(pool.clone(), config).expect("Failed to build state");
    (server::app::build_router(state), pool)
}

/// Build the router over a WAL-mode database file with a multi-connection
/// pool. Keep the returned directory alive for the duration of the test.
pub async fn file_test_app(config: AppConfig) -> (Router, SqlitePool, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let mut config = config;
    config.database.url = format!("sqlite://{}?mode=rwc", dir.path().join("cases.db").display());
    config.database.max_connections = 8;
    let (app, pool) = test_app_with(config).await;
    (app, pool, dir)
}

/// Send a request and decode the JSON body (Null when empty).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, _headers, body) = send_with_headers(app, req).await;
    (status, body)
}

pub async fn send_with_headers(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");

    let body: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&body_bytes).to_string(),
        ))
    };

    (status, headers, body)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// POST JSON without credentials.
pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(app, request("POST", uri, None, Some(body))).await
}

/// POST JSON with a Bearer token.
pub async fn post_json_authed(
    app: &Router,
    uri: &str,
    body: &Value,
    token: &str,
) -> (StatusCode, Value) {
    send(app, request("POST", uri, Some(token), Some(body))).await
}

/// PATCH with a Bearer token and no body.
pub async fn patch_authed(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, request("PATCH", uri, Some(token), None)).await
}

/// GET with a Bearer token.
pub async fn get_authed(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, request("GET", uri, Some(token), None)).await
}

/// GET without credentials.
pub async fn get_anon(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, request("GET", uri, None, None)).await
}

// ── Accounts ────────────────────────────────────────────────────────

/// Token of a freshly registered account.
fn token_of(status: StatusCode, body: &Value) -> String {
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    body["token"].as_str().expect("signup returns a token").to_string()
}

pub async fn signup_detainee(app: &Router, username: &str) -> String {
    let (status, body) = post_json(
        app,
        "/detainee/signup",
        &json!({
            "name": format!("Detainee {username}"),
            "address": "Yerwada, Pune",
            "email": format!("{username}@detainee.test"),
            "username": username,
            "password": "password123",
        }),
    )
    .await;
    token_of(status, &body)
}

pub async fn signup_lawyer(app: &Router, username: &str, lawyer_id: i64) -> String {
    let (status, body) = post_json(
        app,
        "/lawyer/signup",
        &json!({
            "name": format!("Adv. {username}"),
            "lawyerId": lawyer_id,
            "address": "Shivajinagar, Pune",
            "email": format!("{username}@bar.test"),
            "username": username,
            "password": "password123",
        }),
    )
    .await;
    token_of(status, &body)
}

pub async fn signup_judge(app: &Router, username: &str, judge_id: i64) -> String {
    let (status, body) = post_json(
        app,
        "/judge/signup",
        &json!({
            "name": format!("Justice {username}"),
            "judgeId": judge_id,
            "address": "District Court, Pune",
            "email": format!("{username}@court.test"),
            "username": username,
            "password": "password123",
        }),
    )
    .await;
    token_of(status, &body)
}

// ── Cases ───────────────────────────────────────────────────────────

/// A summary comfortably over the minimum length.
pub fn long_summary() -> String {
    "The accused was detained following a complaint alleging theft of goods \
     from a warehouse in the industrial area. Investigation is complete, the \
     charge sheet has been filed, and the recovered property is in police \
     custody. The accused has no prior record and has cooperated fully with \
     the investigating officer throughout."
        .to_string()
}

/// Registration body for a case linking all three parties.
pub fn case_body(case_id: &str, judge_id: i64, lawyer_id: i64, detainee: &str) -> Value {
    json!({
        "caseId": case_id,
        "caseTitle": format!("State v. {detainee}"),
        "bnsSections": ["303", 318],
        "courtName": "Sessions Court, Pune",
        "filingDate": "2024-03-01",
        "hearingDates": ["2024-03-15", "2024-04-02"],
        "policeStation": "Hadapsar",
        "caseSummary": long_summary(),
        "judgeId": judge_id,
        "lawyerId": lawyer_id.to_string(),
        "detaineeUsername": detainee,
        "groundsOfBail": ["First offence", "Cooperated with investigation"],
        "severityOfOffence": "Moderate",
        "crimeType": "Theft",
        "accusedAge": 24,
        "hasPermanentAddress": true,
    })
}

/// The three parties plus one registered case.
pub struct Parties {
    pub detainee: String,
    pub lawyer: String,
    pub judge: String,
}

pub const JUDGE_ID: i64 = 7001;
pub const LAWYER_ID: i64 = 501;

/// Register a detainee `asha`, lawyer `rmehta` and judge `jrao`, then have
/// the lawyer register `case_id` for them.
pub async fn seed_case(app: &Router, case_id: &str) -> Parties {
    let parties = Parties {
        detainee: signup_detainee(app, "asha").await,
        lawyer: signup_lawyer(app, "rmehta", LAWYER_ID).await,
        judge: signup_judge(app, "jrao", JUDGE_ID).await,
    };
    register_case(app, &parties.lawyer, case_id).await;
    parties
}

pub async fn register_case(app: &Router, token: &str, case_id: &str) -> Value {
    let (status, body) = post_json_authed(
        app,
        "/case/register",
        &case_body(case_id, JUDGE_ID, LAWYER_ID, "asha"),
        token,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body
}

// ── AI service stub ─────────────────────────────────────────────────

/// A fake recommendation service that records every payload it receives.
pub struct AiStub {
    pub url: String,
    pub received: Arc<Mutex<Vec<Value>>>,
}

/// Serve `reply` from `POST /find-similar-cases` on an ephemeral port.
pub async fn spawn_ai_stub(reply: Value) -> AiStub {
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();
    let router = Router::new().route(
        "/find-similar-cases",
        post(move |Json(request): Json<Value>| {
            let reply = reply.clone();
            let log = log.clone();
            async move {
                log.lock().unwrap().push(request);
                Json(reply)
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    AiStub {
        url: format!("http://{addr}"),
        received,
    }
}

/// An address nothing listens on.
pub async fn dead_ai_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("address");
    drop(listener);
    format!("http://{addr}")
}
