use chrono::{DateTime, NaiveDate, Utc};
use shared_types::{AppError, BailStatus, CaseRecord};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};
use std::collections::BTreeMap;

use crate::error_convert::SqlxErrorExt;

/// Fields for a freshly registered case. Lists are encoded to JSON text on insert.
pub struct NewCase {
    pub case_id: String,
    pub case_title: String,
    pub bns_sections: Vec<String>,
    pub court_name: String,
    pub judge_id: i64,
    pub judge_name: String,
    pub judge_username: String,
    pub lawyer_id: i64,
    pub lawyer_name: String,
    pub lawyer_username: String,
    pub detainee_username: Option<String>,
    pub detainee_name: Option<String>,
    pub filing_date: NaiveDate,
    pub hearing_dates: Vec<NaiveDate>,
    pub police_station: String,
    pub case_summary: String,
    pub grounds_of_bail: Vec<String>,
    pub severity_of_offence: Option<String>,
    pub case_points: BTreeMap<String, String>,
}

/// Whose cases to list.
#[derive(Debug, Clone, Copy)]
pub enum CaseOwner<'a> {
    Judge(&'a str),
    Lawyer(i64),
    Detainee(&'a str),
}

/// Column writes that accompany a status change.
#[derive(Debug, Default)]
pub struct StatusUpdate {
    pub judge_comments: Option<Vec<String>>,
    pub ai_recommendation: Option<String>,
    pub bail_filing_date: Option<DateTime<Utc>>,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|e| AppError::internal(format!("failed to encode case field: {e}")))
}

/// Insert a new case with an empty bail status.
pub async fn insert(db: impl SqliteExecutor<'_>, new: NewCase) -> Result<CaseRecord, AppError> {
    let now = Utc::now();
    sqlx::query_as::<_, CaseRecord>(
        r#"
        INSERT INTO cases
            (case_id, case_title, bns_sections, bail_status, court_name,
             judge_id, judge_name, judge_username,
             lawyer_id, lawyer_name, lawyer_username,
             detainee_username, detainee_name,
             filing_date, hearing_dates, police_station, case_summary,
             grounds_of_bail, judge_comments, severity_of_offence,
             ai_recommendation, case_points, created_at, updated_at)
        VALUES (?, ?, ?, '', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, '[]', ?, '', ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new.case_id)
    .bind(&new.case_title)
    .bind(to_json(&new.bns_sections)?)
    .bind(&new.court_name)
    .bind(new.judge_id)
    .bind(&new.judge_name)
    .bind(&new.judge_username)
    .bind(new.lawyer_id)
    .bind(&new.lawyer_name)
    .bind(&new.lawyer_username)
    .bind(&new.detainee_username)
    .bind(&new.detainee_name)
    .bind(new.filing_date)
    .bind(to_json(&new.hearing_dates)?)
    .bind(&new.police_station)
    .bind(&new.case_summary)
    .bind(to_json(&new.grounds_of_bail)?)
    .bind(&new.severity_of_offence)
    .bind(to_json(&new.case_points)?)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn exists(db: impl SqliteExecutor<'_>, case_id: &str) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cases WHERE case_id = ?")
        .bind(case_id)
        .fetch_one(db)
        .await
        .map(|n| n > 0)
        .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_case_id(
    db: impl SqliteExecutor<'_>,
    case_id: &str,
) -> Result<Option<CaseRecord>, AppError> {
    sqlx::query_as::<_, CaseRecord>("SELECT * FROM cases WHERE case_id = ?")
        .bind(case_id)
        .fetch_optional(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

/// Fetch every stored case whose id is in `case_ids`.
pub async fn find_many(
    db: impl SqliteExecutor<'_>,
    case_ids: &[String],
) -> Result<Vec<CaseRecord>, AppError> {
    if case_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM cases WHERE case_id IN (");
    let mut ids = qb.separated(", ");
    for id in case_ids {
        ids.push_bind(id);
    }
    ids.push_unseparated(")");
    qb.build_query_as::<CaseRecord>()
        .fetch_all(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

/// List an owner's cases, newest filing first. An empty `statuses` slice
/// means every status.
pub async fn list(
    db: impl SqliteExecutor<'_>,
    owner: CaseOwner<'_>,
    statuses: &[BailStatus],
) -> Result<Vec<CaseRecord>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM cases WHERE ");
    match owner {
        CaseOwner::Judge(username) => qb.push("judge_username = ").push_bind(username),
        CaseOwner::Lawyer(lawyer_id) => qb.push("lawyer_id = ").push_bind(lawyer_id),
        CaseOwner::Detainee(username) => qb.push("detainee_username = ").push_bind(username),
    };

    if !statuses.is_empty() {
        qb.push(" AND bail_status IN (");
        let mut list = qb.separated(", ");
        for status in statuses {
            list.push_bind(status.as_str());
        }
        list.push_unseparated(")");
    }

    qb.push(" ORDER BY filing_date DESC, id DESC");

    qb.build_query_as::<CaseRecord>()
        .fetch_all(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

/// Compare-and-set the bail status.
///
/// Writes only if the row still holds `from` and returns the updated row;
/// `None` means another request moved the case first. Must be the first
/// statement of the caller's transaction, ahead of the audit insert.
pub async fn set_status(
    conn: &mut SqliteConnection,
    case_id: &str,
    from: BailStatus,
    to: BailStatus,
    update: &StatusUpdate,
) -> Result<Option<CaseRecord>, AppError> {
    let comments = update.judge_comments.as_ref().map(to_json).transpose()?;

    sqlx::query_as::<_, CaseRecord>(
        r#"
        UPDATE cases
        SET bail_status = ?,
            judge_comments = COALESCE(?, judge_comments),
            ai_recommendation = COALESCE(?, ai_recommendation),
            bail_filing_date = COALESCE(bail_filing_date, ?),
            updated_at = ?
        WHERE case_id = ? AND bail_status = ?
        RETURNING *
        "#,
    )
    .bind(to.as_str())
    .bind(comments)
    .bind(&update.ai_recommendation)
    .bind(update.bail_filing_date)
    .bind(Utc::now())
    .bind(case_id)
    .bind(from.as_str())
    .fetch_optional(conn)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}
