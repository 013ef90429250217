use axum::{
    extract::{Path, State},
    Json,
};
use sqlx::SqlitePool;
use std::sync::Arc;

use shared_types::{
    parse_comments, AppConfig, AppError, BailDecision, BailDecisionRequest, BailStatus,
    CaseResponse, Lifecycle,
};

use crate::auth::extractors::AuthRequired;
use crate::auth::jwt::Claims;
use crate::error_convert::ApiJson;
use crate::lifecycle;
use crate::repo::case::{self, CaseOwner, StatusUpdate};

async fn list_for(
    pool: &SqlitePool,
    claims: &Claims,
    username: &str,
    statuses: &[BailStatus],
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    if claims.username != username {
        return Err(AppError::forbidden("You can only view cases assigned to you"));
    }
    let cases = case::list(pool, CaseOwner::Judge(username), statuses).await?;
    Ok(Json(cases.into_iter().map(CaseResponse::from).collect()))
}

/// GET /judge/cases/{username}
#[utoipa::path(
    get,
    path = "/judge/cases/{username}",
    params(("username" = String, Path, description = "Judge username")),
    responses(
        (status = 200, description = "Every case assigned to the judge", body = Vec<CaseResponse>),
        (status = 403, description = "Another judge's cases", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "judge"
)]
pub async fn assigned_cases(
    State(pool): State<SqlitePool>,
    AuthRequired(claims): AuthRequired,
    Path(username): Path<String>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    list_for(&pool, &claims, &username, &[]).await
}

/// GET /judge/bail-appeals/{username}
#[utoipa::path(
    get,
    path = "/judge/bail-appeals/{username}",
    params(("username" = String, Path, description = "Judge username")),
    responses(
        (status = 200, description = "Bail applications awaiting decision", body = Vec<CaseResponse>),
        (status = 403, description = "Another judge's cases", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "judge"
)]
pub async fn bail_appeals(
    State(pool): State<SqlitePool>,
    AuthRequired(claims): AuthRequired,
    Path(username): Path<String>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    list_for(&pool, &claims, &username, &[BailStatus::PendingToJudge]).await
}

/// GET /judge/decided-cases/{username}
#[utoipa::path(
    get,
    path = "/judge/decided-cases/{username}",
    params(("username" = String, Path, description = "Judge username")),
    responses(
        (status = 200, description = "Cases the judge has decided", body = Vec<CaseResponse>),
        (status = 403, description = "Another judge's cases", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "judge"
)]
pub async fn decided_cases(
    State(pool): State<SqlitePool>,
    AuthRequired(claims): AuthRequired,
    Path(username): Path<String>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    list_for(
        &pool,
        &claims,
        &username,
        &[BailStatus::Accepted, BailStatus::Declined],
    )
    .await
}

/// POST /judge/bail-decision
#[utoipa::path(
    post,
    path = "/judge/bail-decision",
    request_body = BailDecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = CaseResponse),
        (status = 400, description = "Status is not Accepted or Declined", body = AppError),
        (status = 403, description = "Case is assigned to another judge", body = AppError),
        (status = 404, description = "Case not found", body = AppError),
        (status = 409, description = "Case is not awaiting a decision", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "judge"
)]
#[tracing::instrument(skip_all, fields(case_id = %body.case_id, status = %body.status))]
pub async fn bail_decision(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    AuthRequired(claims): AuthRequired,
    ApiJson(body): ApiJson<BailDecisionRequest>,
) -> Result<Json<CaseResponse>, AppError> {
    let decision = BailDecision::parse(&body.status).ok_or_else(|| {
        AppError::bad_request("Invalid bail status. Must be 'Accepted' or 'Declined'")
    })?;
    let case_id = body.case_id.trim();
    if case_id.is_empty() {
        return Err(AppError::bad_request("caseId is required"));
    }

    // Comments replace the stored list; an omitted field leaves it as is.
    let update = StatusUpdate {
        judge_comments: body.comments.as_deref().map(parse_comments),
        ai_recommendation: body.ai_recommendation,
        bail_filing_date: None,
    };

    let record = lifecycle::transition(
        &pool,
        Lifecycle::new(config.lifecycle.allow_redecision),
        case_id,
        decision.event(),
        &claims,
        update,
    )
    .await?;
    Ok(Json(CaseResponse::from(record)))
}
