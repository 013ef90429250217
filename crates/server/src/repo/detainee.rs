use chrono::Utc;
use shared_types::{AppError, Detainee};
use sqlx::SqliteExecutor;

use crate::error_convert::SqlxErrorExt;

/// Fields for a new detainee row. `email` is stored lowercased.
pub struct NewDetainee<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
}

/// Insert a new detainee.
pub async fn create(db: impl SqliteExecutor<'_>, new: NewDetainee<'_>) -> Result<Detainee, AppError> {
    sqlx::query_as::<_, Detainee>(
        r#"
        INSERT INTO detainees (name, address, email, username, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
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

pub async fn find_by_email(
    db: impl SqliteExecutor<'_>,
    email: &str,
) -> Result<Option<Detainee>, AppError> {
    sqlx::query_as::<_, Detainee>("SELECT * FROM detainees WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_username(
    db: impl SqliteExecutor<'_>,
    username: &str,
) -> Result<Option<Detainee>, AppError> {
    sqlx::query_as::<_, Detainee>("SELECT * FROM detainees WHERE username = ?")
        .bind(username.trim())
        .fetch_optional(db)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

/// Login lookup: an identifier containing `@` is an email, anything else a username.
pub async fn find_by_login(
    db: impl SqliteExecutor<'_>,
    email_or_username: &str,
) -> Result<Option<Detainee>, AppError> {
    if email_or_username.contains('@') {
        find_by_email(db, email_or_username).await
    } else {
        find_by_username(db, email_or_username).await
    }
}
