use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

use shared_types::{AppConfig, AppError, BailEvent, BailStatus, CaseResponse, Lifecycle};

use crate::auth::extractors::AuthRequired;
use crate::auth::jwt::Claims;
use crate::lifecycle;
use crate::repo::case::{self, CaseOwner, StatusUpdate};

/// Detainees may only list their own cases.
fn ensure_self(claims: &Claims, username: &str) -> Result<(), AppError> {
    if claims.username != username {
        return Err(AppError::forbidden("You can only view your own cases"));
    }
    Ok(())
}

/// PATCH /detainee/{caseid}/raise-bail
#[utoipa::path(
    patch,
    path = "/detainee/{caseid}/raise-bail",
    params(("caseid" = String, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Bail request sent to the lawyer", body = CaseResponse),
        (status = 403, description = "Not the detainee on this case", body = AppError),
        (status = 404, description = "Case not found", body = AppError),
        (status = 409, description = "Bail already raised or decided", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "detainee"
)]
#[tracing::instrument(skip(pool, config, claims))]
pub async fn raise_bail(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    AuthRequired(claims): AuthRequired,
    Path(case_id): Path<String>,
) -> Result<Json<CaseResponse>, AppError> {
    let update = StatusUpdate {
        bail_filing_date: Some(Utc::now()),
        ..Default::default()
    };
    let record = lifecycle::transition(
        &pool,
        Lifecycle::new(config.lifecycle.allow_redecision),
        &case_id,
        BailEvent::RaiseBail,
        &claims,
        update,
    )
    .await?;
    Ok(Json(CaseResponse::from(record)))
}

/// GET /detainee/ongoing/{username}
#[utoipa::path(
    get,
    path = "/detainee/ongoing/{username}",
    params(("username" = String, Path, description = "Detainee username")),
    responses(
        (status = 200, description = "All of the detainee's cases", body = Vec<CaseResponse>),
        (status = 403, description = "Another detainee's cases", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "detainee"
)]
pub async fn ongoing_cases(
    State(pool): State<SqlitePool>,
    AuthRequired(claims): AuthRequired,
    Path(username): Path<String>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    ensure_self(&claims, &username)?;
    let cases = case::list(&pool, CaseOwner::Detainee(&username), &[]).await?;
    Ok(Json(cases.into_iter().map(CaseResponse::from).collect()))
}

/// GET /detainee/decided/{username}
#[utoipa::path(
    get,
    path = "/detainee/decided/{username}",
    params(("username" = String, Path, description = "Detainee username")),
    responses(
        (status = 200, description = "Cases with a bail decision", body = Vec<CaseResponse>),
        (status = 403, description = "Another detainee's cases", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "detainee"
)]
pub async fn decided_cases(
    State(pool): State<SqlitePool>,
    AuthRequired(claims): AuthRequired,
    Path(username): Path<String>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    ensure_self(&claims, &username)?;
    let cases = case::list(
        &pool,
        CaseOwner::Detainee(&username),
        &[BailStatus::Accepted, BailStatus::Declined],
    )
    .await?;
    Ok(Json(cases.into_iter().map(CaseResponse::from).collect()))
}
