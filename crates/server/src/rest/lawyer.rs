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

/// Parse the `{lawyerid}` segment and make sure it is the caller's own id.
fn own_lawyer_id(claims: &Claims, raw: &str) -> Result<i64, AppError> {
    let lawyer_id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::bad_request("Lawyer ID must be an integer"))?;
    if lawyer_id != claims.id {
        return Err(AppError::forbidden("You can only view your own cases"));
    }
    Ok(lawyer_id)
}

async fn list_for(
    pool: &SqlitePool,
    claims: &Claims,
    raw_id: &str,
    statuses: &[BailStatus],
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    let lawyer_id = own_lawyer_id(claims, raw_id)?;
    let cases = case::list(pool, CaseOwner::Lawyer(lawyer_id), statuses).await?;
    Ok(Json(cases.into_iter().map(CaseResponse::from).collect()))
}

/// GET /lawyer/{lawyerid}/ongoing-cases
#[utoipa::path(
    get,
    path = "/lawyer/{lawyerid}/ongoing-cases",
    params(("lawyerid" = i64, Path, description = "Lawyer ID")),
    responses(
        (status = 200, description = "All cases the lawyer is attached to", body = Vec<CaseResponse>),
        (status = 400, description = "Non-numeric lawyer ID", body = AppError),
        (status = 403, description = "Another lawyer's cases", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "lawyer"
)]
pub async fn ongoing_cases(
    State(pool): State<SqlitePool>,
    AuthRequired(claims): AuthRequired,
    Path(lawyer_id): Path<String>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    list_for(&pool, &claims, &lawyer_id, &[]).await
}

/// GET /lawyer/bail-appeals/{lawyerid}
#[utoipa::path(
    get,
    path = "/lawyer/bail-appeals/{lawyerid}",
    params(("lawyerid" = i64, Path, description = "Lawyer ID")),
    responses(
        (status = 200, description = "Bail requests raised by detainees", body = Vec<CaseResponse>),
        (status = 403, description = "Another lawyer's cases", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "lawyer"
)]
pub async fn bail_appeals(
    State(pool): State<SqlitePool>,
    AuthRequired(claims): AuthRequired,
    Path(lawyer_id): Path<String>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    list_for(&pool, &claims, &lawyer_id, &[BailStatus::PendingToLawyer]).await
}

/// GET /lawyer/pending-bails/{lawyerid}
#[utoipa::path(
    get,
    path = "/lawyer/pending-bails/{lawyerid}",
    params(("lawyerid" = i64, Path, description = "Lawyer ID")),
    responses(
        (status = 200, description = "Bail applications awaiting a judge", body = Vec<CaseResponse>),
        (status = 403, description = "Another lawyer's cases", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "lawyer"
)]
pub async fn pending_bails(
    State(pool): State<SqlitePool>,
    AuthRequired(claims): AuthRequired,
    Path(lawyer_id): Path<String>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    list_for(&pool, &claims, &lawyer_id, &[BailStatus::PendingToJudge]).await
}

/// PATCH /lawyer/{caseid}/forward-to-judge
#[utoipa::path(
    patch,
    path = "/lawyer/{caseid}/forward-to-judge",
    params(("caseid" = String, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Bail application sent to the judge", body = CaseResponse),
        (status = 403, description = "Not the lawyer on this case", body = AppError),
        (status = 404, description = "Case not found", body = AppError),
        (status = 409, description = "Case already with the judge or decided", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "lawyer"
)]
#[tracing::instrument(skip(pool, config, claims))]
pub async fn forward_to_judge(
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
        BailEvent::ForwardToJudge,
        &claims,
        update,
    )
    .await?;
    Ok(Json(CaseResponse::from(record)))
}
