use chrono::Utc;
use shared_types::{AppError, BailEvent, BailStatus, CaseEvent, UserRole};
use sqlx::SqliteExecutor;

use crate::error_convert::SqlxErrorExt;

/// One lifecycle transition to append to the log.
pub struct NewCaseEvent<'a> {
    pub case_id: &'a str,
    pub from: BailStatus,
    pub to: BailStatus,
    pub event: BailEvent,
    pub actor_role: UserRole,
    pub actor_username: &'a str,
    pub comments: &'a [String],
}

/// Append a transition to the audit log.
pub async fn insert(db: impl SqliteExecutor<'_>, new: NewCaseEvent<'_>) -> Result<CaseEvent, AppError> {
    let comments = serde_json::to_string(new.comments)
        .map_err(|e| AppError::internal(format!("failed to encode comments: {e}")))?;

    sqlx::query_as::<_, CaseEvent>(
        r#"
        INSERT INTO case_events
            (case_id, from_status, to_status, event, actor_role, actor_username, comments, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(new.case_id)
    .bind(new.from.as_str())
    .bind(new.to.as_str())
    .bind(new.event.as_str())
    .bind(new.actor_role.as_str())
    .bind(new.actor_username)
    .bind(comments)
    .bind(Utc::now())
    .fetch_one(db)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// A case's transitions, oldest first.
pub async fn list_by_case(
    db: impl SqliteExecutor<'_>,
    case_id: &str,
) -> Result<Vec<CaseEvent>, AppError> {
    sqlx::query_as::<_, CaseEvent>("SELECT * FROM case_events WHERE case_id = ? ORDER BY id ASC")
        .bind(case_id)
        .fetch_all(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}
