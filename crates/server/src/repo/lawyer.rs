use chrono::Utc;
use shared_types::{AppError, IdOrText, Lawyer};
use sqlx::SqliteExecutor;

use crate::error_convert::SqlxErrorExt;

/// Fields for a new lawyer row. `email` is stored lowercased.
pub struct NewLawyer<'a> {
    pub lawyer_id: i64,
    pub name: &'a str,
    pub address: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
}

/// Insert a new lawyer.
pub async fn create(db: impl SqliteExecutor<'_>, new: NewLawyer<'_>) -> Result<Lawyer, AppError> {
    sqlx::query_as::<_, Lawyer>(
        r#"
        INSERT INTO lawyers (lawyer_id, name, address, email, username, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(new.lawyer_id)
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

/// Find a lawyer by bar council id.
pub async fn find_by_lawyer_id(
    db: impl SqliteExecutor<'_>,
    lawyer_id: i64,
) -> Result<Option<Lawyer>, AppError> {
    sqlx::query_as::<_, Lawyer>("SELECT * FROM lawyers WHERE lawyer_id = ?")
        .bind(lawyer_id)
        .fetch_optional(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_email(
    db: impl SqliteExecutor<'_>,
    email: &str,
) -> Result<Option<Lawyer>, AppError> {
    sqlx::query_as::<_, Lawyer>("SELECT * FROM lawyers WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_username(
    db: impl SqliteExecutor<'_>,
    username: &str,
) -> Result<Option<Lawyer>, AppError> {
    sqlx::query_as::<_, Lawyer>("SELECT * FROM lawyers WHERE username = ?")
        .bind(username.trim())
        .fetch_optional(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

/// Login lookup: the identifier may be an email, a username or a numeric
/// lawyer id.
pub async fn find_by_login(
    db: impl SqliteExecutor<'_>,
    identifier: &IdOrText,
) -> Result<Option<Lawyer>, AppError> {
    let text = identifier.as_text();
    sqlx::query_as::<_, Lawyer>(
        r#"
        SELECT * FROM lawyers
        WHERE email = ? OR username = ? OR lawyer_id = ?
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(text.to_lowercase())
    .bind(&text)
    .bind(identifier.as_i64())
    .fetch_optional(db)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}
