use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use shared_types::{
    AppError, AppErrorKind, CaseEventResponse, CaseRecord, CaseResponse, ProcessCaseResponse,
    RegisterCaseRequest, UserRole,
};

use crate::ai_client::AiClient;
use crate::auth::extractors::AuthRequired;
use crate::error_convert::{ApiJson, ValidateRequest};
use crate::repo;

/// Length of generated case ids.
const CASE_ID_LEN: usize = 10;

fn generate_case_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CASE_ID_LEN)
        .map(char::from)
        .collect()
}

async fn load_case(pool: &SqlitePool, case_id: &str) -> Result<CaseRecord, AppError> {
    repo::case::find_by_case_id(pool, case_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {case_id} not found")))
}

/// POST /case/register
#[utoipa::path(
    post,
    path = "/case/register",
    request_body = RegisterCaseRequest,
    responses(
        (status = 201, description = "Case registered", body = CaseResponse),
        (status = 400, description = "Invalid request or duplicate case id", body = AppError),
        (status = 404, description = "Judge, lawyer or detainee not found", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "cases"
)]
#[tracing::instrument(skip_all, fields(actor = %claims.username))]
pub async fn register_case(
    State(pool): State<SqlitePool>,
    AuthRequired(claims): AuthRequired,
    ApiJson(body): ApiJson<RegisterCaseRequest>,
) -> Result<(StatusCode, Json<CaseResponse>), AppError> {
    body.validate_request()?;

    let judge_id = body
        .judge_id
        .as_i64()
        .ok_or_else(|| AppError::bad_request("Judge ID must be an integer"))?;
    let lawyer_id = body
        .lawyer_id
        .as_ref()
        .filter(|id| !id.is_blank())
        .ok_or_else(|| AppError::bad_request("Lawyer ID is required"))?
        .as_i64()
        .ok_or_else(|| AppError::bad_request("Lawyer ID must be an integer"))?;
    let detainee_username = body
        .detainee_username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    let case_id = match body.case_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => generate_case_id(),
    };
    let duplicate = || AppError::bad_request(format!("Case {case_id} already exists"));

    if repo::case::exists(&pool, &case_id).await? {
        return Err(duplicate());
    }

    let judge = repo::judge::find_by_judge_id(&pool, judge_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Judge with ID {judge_id} not found")))?;

    let lawyer = repo::lawyer::find_by_lawyer_id(&pool, lawyer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Lawyer with ID {lawyer_id} not found")))?;

    let detainee = match detainee_username {
        Some(username) => Some(
            repo::detainee::find_by_username(&pool, username)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Detainee {username} not found")))?,
        ),
        None => None,
    };

    let bns_sections: Vec<String> = body
        .bns_sections
        .iter()
        .map(|s| s.as_text())
        .filter(|s| !s.is_empty())
        .collect();
    let case_points = body.factors.to_case_points(&bns_sections);

    // A single insert; a racing registration of the same id trips the
    // UNIQUE constraint instead of the check above.
    let record = repo::case::insert(
        &pool,
        repo::case::NewCase {
            case_id: case_id.clone(),
            case_title: body.case_title.trim().to_string(),
            bns_sections,
            court_name: body.court_name.trim().to_string(),
            judge_id: judge.judge_id,
            judge_name: judge.name,
            judge_username: judge.username,
            lawyer_id: lawyer.lawyer_id,
            lawyer_name: lawyer.name,
            lawyer_username: lawyer.username,
            detainee_username: detainee.as_ref().map(|d| d.username.clone()),
            detainee_name: detainee.map(|d| d.name),
            filing_date: body.filing_date,
            hearing_dates: body.hearing_dates,
            police_station: body.police_station.trim().to_string(),
            case_summary: body.case_summary,
            grounds_of_bail: body.grounds_of_bail,
            severity_of_offence: body.severity_of_offence,
            case_points,
        },
    )
    .await
    .map_err(|e| match e.kind {
        AppErrorKind::Conflict => duplicate(),
        _ => e,
    })?;

    tracing::info!(case_id = %record.case_id, role = %claims.role, "case registered");
    Ok((StatusCode::CREATED, Json(CaseResponse::from(record))))
}

/// GET /case/{caseid}
#[utoipa::path(
    get,
    path = "/case/{caseid}",
    params(("caseid" = String, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case found", body = CaseResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "cases"
)]
pub async fn get_case(
    State(pool): State<SqlitePool>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseResponse>, AppError> {
    let record = load_case(&pool, &case_id).await?;
    Ok(Json(CaseResponse::from(record)))
}

/// GET /case/{caseid}/history
#[utoipa::path(
    get,
    path = "/case/{caseid}/history",
    params(("caseid" = String, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Lifecycle transitions, oldest first", body = Vec<CaseEventResponse>),
        (status = 404, description = "Not found", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "cases"
)]
pub async fn case_history(
    State(pool): State<SqlitePool>,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<CaseEventResponse>>, AppError> {
    if !repo::case::exists(&pool, &case_id).await? {
        return Err(AppError::not_found(format!("Case {case_id} not found")));
    }
    let events = repo::case_event::list_by_case(&pool, &case_id).await?;
    Ok(Json(events.into_iter().map(CaseEventResponse::from).collect()))
}

/// Merge a stored case into a similar-case entry: the stored document wins,
/// with the upstream similarity score kept alongside it.
fn enrich_similar(entry: Value, stored: &[CaseRecord]) -> Result<Value, AppError> {
    let Some(found) = entry
        .get("caseId")
        .and_then(Value::as_str)
        .and_then(|id| stored.iter().find(|c| c.case_id == id))
    else {
        return Ok(entry);
    };

    let mut merged = Map::new();
    merged.insert(
        "similarityPercentage".to_string(),
        entry.get("similarityPercentage").cloned().unwrap_or(Value::Null),
    );
    let case_json = serde_json::to_value(CaseResponse::from(found.clone()))
        .map_err(|e| AppError::internal(format!("failed to encode case: {e}")))?;
    if let Value::Object(fields) = case_json {
        merged.extend(fields);
    }
    Ok(Value::Object(merged))
}

/// POST /case/{entity}/{caseid}/process-case
#[utoipa::path(
    post,
    path = "/case/{entity}/{caseid}/process-case",
    params(
        ("entity" = String, Path, description = "lawyer, judge or detainee"),
        ("caseid" = String, Path, description = "Case ID")
    ),
    request_body(content = Object, description = "Extra fields forwarded to the AI service"),
    responses(
        (status = 200, description = "AI assistance for the case", body = ProcessCaseResponse),
        (status = 400, description = "Unknown entity or malformed body", body = AppError),
        (status = 404, description = "Case not found", body = AppError),
        (status = 502, description = "AI service failed", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "cases"
)]
#[tracing::instrument(skip(pool, ai, body))]
pub async fn process_case(
    State(pool): State<SqlitePool>,
    State(ai): State<AiClient>,
    Path((entity, case_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ProcessCaseResponse>, AppError> {
    let entity = UserRole::parse(&entity)
        .ok_or_else(|| AppError::bad_request("Entity must be one of lawyer, judge or detainee"))?;

    let mut payload: Map<String, Value> = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::bad_request(format!("Request body must be a JSON object: {e}")))?
    };

    let record = load_case(&pool, &case_id).await?;
    let current = CaseResponse::from(record);

    payload.insert("entity".into(), Value::from(entity.as_str()));
    payload.insert("caseId".into(), Value::from(current.case_id.clone()));
    payload.insert("caseSummary".into(), Value::from(current.case_summary.clone()));
    payload.insert("groundsOfBail".into(), Value::from(current.grounds_of_bail.clone()));
    payload.insert("judgeComments".into(), Value::from(current.judge_comments.clone()));
    payload.insert("caseTitle".into(), Value::from(current.case_title.clone()));
    payload.insert("bnsSections".into(), Value::from(current.bns_sections.clone()));
    payload.insert(
        "casePoints".into(),
        Value::Object(
            current
                .case_points
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
        ),
    );

    let reply = ai.find_similar_cases(&Value::Object(payload)).await?;

    let ids: Vec<String> = reply
        .similar_cases
        .iter()
        .filter_map(|c| c.get("caseId").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    let stored = repo::case::find_many(&pool, &ids).await?;

    let similar_cases = reply
        .similar_cases
        .into_iter()
        .map(|entry| enrich_similar(entry, &stored))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(similar = similar_cases.len(), "AI assistance served");
    Ok(Json(ProcessCaseResponse {
        ai_assistance: reply.ai_assistance,
        bail_decision: reply.bail_decision,
        current_case: current,
        similar_cases,
    }))
}
