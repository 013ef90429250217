use chrono::Utc;
use shared_types::{AppError, IdOrText, Judge};
use sqlx::{SqliteExecutor, SqlitePool};

use crate::error_convert::SqlxErrorExt;

/// Fields for a new judge row. `email` is stored lowercased.
pub struct NewJudge<'a> {
    pub judge_id: i64,
    pub name: &'a str,
    pub address: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
}

/// Insert a new judge.
pub async fn create(db: impl SqliteExecutor<'_>, new: NewJudge<'_>) -> Result<Judge, AppError> {
    sqlx::query_as::<_, Judge>(
        r#"
        INSERT INTO judges (judge_id, name, address, email, username, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(new.judge_id)
    .bind(new.name)
    .bind(new.address)
    .bind(new.email.to_lowercase())
    .bind(new.username)
    .bind(new.password_hash)
    .bind(Utc::now())
    .fetch_one(db)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Find a judge by court-assigned id.
pub async fn find_by_judge_id(
    db: impl SqliteExecutor<'_>,
    judge_id: i64,
) -> Result<Option<Judge>, AppError> {
    sqlx::query_as::<_, Judge>("SELECT * FROM judges WHERE judge_id = ?")
        .bind(judge_id)
        .fetch_optional(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_email(
    db: impl SqliteExecutor<'_>,
    email: &str,
) -> Result<Option<Judge>, AppError> {
    sqlx::query_as::<_, Judge>("SELECT * FROM judges WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_username(
    db: impl SqliteExecutor<'_>,
    username: &str,
) -> Result<Option<Judge>, AppError> {
    sqlx::query_as::<_, Judge>("SELECT * FROM judges WHERE username = ?")
        .bind(username.trim())
        .fetch_optional(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

/// Login lookup: username first, then numeric judge id.
pub async fn find_by_login(
    pool: &SqlitePool,
    identifier: &IdOrText,
) -> Result<Option<Judge>, AppError> {
    if let Some(judge) = find_by_username(pool, &identifier.as_text()).await? {
        return Ok(Some(judge));
    }
    match identifier.as_i64() {
        Some(judge_id) => find_by_judge_id(pool, judge_id).await,
        None => Ok(None),
    }
}
