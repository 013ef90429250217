use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use shared_types::AppError;

/// Primary SQLite result codes for a lock held by another connection.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Whether the database refused the statement because another writer holds
/// the lock. SQLite reports extended codes; the low byte is the primary one.
fn is_lock_contention(db_err: &dyn sqlx::error::DatabaseError) -> bool {
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

/// Convert a sqlx::Error into an AppError.
pub fn sqlx_to_app_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::RowNotFound => AppError::not_found("Resource not found"),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            // SQLite reports the offending column as "UNIQUE constraint failed: table.column".
            let detail = db_err.message();
            let friendly = if detail.contains("email") {
                "An account with this email already exists"
            } else if detail.contains("username") {
                "This username is already taken"
            } else if detail.contains("lawyer_id") {
                "This lawyer ID is already registered"
            } else if detail.contains("judge_id") {
                "This judge ID is already registered"
            } else if detail.contains("case_id") {
                "A case with this ID already exists"
            } else {
                "A record with this value already exists"
            };
            AppError::conflict(friendly)
        }
        sqlx::Error::Database(db_err) if is_lock_contention(&**db_err) => {
            AppError::conflict("The record was changed by another request; reload and retry")
        }
        _ => AppError::database(err.to_string()),
    }
}

/// Extension trait providing `.into_app_error()` on sqlx::Error.
pub trait SqlxErrorExt {
    fn into_app_error(self) -> AppError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_app_error(self) -> AppError {
        sqlx_to_app_error(self)
    }
}

/// Trait for validating request DTOs before processing.
pub trait ValidateRequest {
    fn validate_request(&self) -> Result<(), AppError>;
}

impl<T: validator::Validate> ValidateRequest for T {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate().map_err(AppError::from)
    }
}

/// JSON body extractor that rejects malformed or mistyped bodies with a
/// 400 `AppError`.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
        }
    }
}
