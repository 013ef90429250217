use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use shared_types::BailStatus;
use sqlx::SqlitePool;
use std::sync::OnceLock;
use std::time::Instant;

use crate::ai_client::AiClient;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record the application start time. Call once during startup.
pub fn record_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// Case store status as seen by the health check.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StoreHealth {
    pub reachable: bool,
    /// `wal` for file databases, `memory` for in-memory ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_mode: Option<String>,
    /// Bail applications waiting on a lawyer or a judge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_bail_applications: Option<i64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the case store cannot be reached.
    pub status: String,
    pub store: StoreHealth,
    /// Recommendation service the case proxy forwards to. Not contacted.
    pub ai_service: String,
    pub uptime_seconds: u64,
    pub version: String,
}

async fn check_store(pool: &SqlitePool) -> Result<StoreHealth, sqlx::Error> {
    let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(pool)
        .await?;
    let open: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cases WHERE bail_status IN (?, ?)")
        .bind(BailStatus::PendingToLawyer.as_str())
        .bind(BailStatus::PendingToJudge.as_str())
        .fetch_one(pool)
        .await?;
    Ok(StoreHealth {
        reachable: true,
        journal_mode: Some(journal_mode),
        open_bail_applications: Some(open),
    })
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Case store unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(
    State(pool): State<SqlitePool>,
    State(ai): State<AiClient>,
) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, store) = match check_store(&pool).await {
        Ok(store) => (StatusCode::OK, "ok", store),
        Err(e) => {
            tracing::warn!(error = %e, "health check could not reach the case store");
            let store = StoreHealth {
                reachable: false,
                journal_mode: None,
                open_bail_applications: None,
            };
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", store)
        }
    };

    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    let body = HealthResponse {
        status: status.to_string(),
        store,
        ai_service: ai.base_url().to_string(),
        uptime_seconds: uptime,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (code, Json(body))
}
