use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    Json,
};
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;

use shared_types::{
    AppConfig, AppError, AuthResponse, AuthUser, DetaineeLoginRequest, DetaineeSignupRequest,
    JudgeLoginRequest, JudgeSignupRequest, LawyerLoginRequest, LawyerSignupRequest,
    MessageResponse, RefreshResponse, TokenUser,
};

use crate::auth::extractors::AuthRequired;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{cookies, jwt};
use crate::error_convert::{ApiJson, ValidateRequest};
use crate::repo;

/// Status, session cookie and body returned by signup and login.
pub type SessionReply = (
    StatusCode,
    [(HeaderName, HeaderValue); 1],
    Json<AuthResponse>,
);

/// Sign a token for `user` and wrap it with the matching httpOnly cookie.
fn start_session(
    config: &AppConfig,
    status: StatusCode,
    message: &str,
    id: i64,
    user: AuthUser,
) -> Result<SessionReply, AppError> {
    let ttl = Duration::days(config.auth.token_ttl_days);
    let token = jwt::create_token(
        &config.auth.jwt_secret,
        id,
        &user.email,
        &user.username,
        user.role,
        ttl,
    )
    .map_err(|e| AppError::internal(format!("token signing failed: {e}")))?;
    let cookie = cookies::build_token_cookie(&token, ttl, config.server.is_production())?;

    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            message: message.to_string(),
            user,
            token,
        }),
    ))
}

fn already_registered(field: &str) -> AppError {
    AppError::bad_request(format!("{field} already registered!"))
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid credentials")
}

// ── Signup ──────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/detainee/signup",
    request_body = DetaineeSignupRequest,
    responses(
        (status = 201, description = "Detainee registered", body = AuthResponse),
        (status = 400, description = "Invalid or duplicate details", body = AppError)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all, fields(username = %body.username))]
pub async fn detainee_signup(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    ApiJson(body): ApiJson<DetaineeSignupRequest>,
) -> Result<SessionReply, AppError> {
    body.validate_request()?;

    if repo::detainee::find_by_email(&pool, &body.email).await?.is_some() {
        return Err(already_registered("Email"));
    }
    if repo::detainee::find_by_username(&pool, &body.username).await?.is_some() {
        return Err(already_registered("Username"));
    }

    let password_hash = hash_password(&body.password)?;
    let detainee = repo::detainee::create(
        &pool,
        repo::detainee::NewDetainee {
            name: body.name.trim(),
            address: body.address.trim(),
            email: body.email.trim(),
            username: body.username.trim(),
            password_hash: &password_hash,
        },
    )
    .await?;

    tracing::info!(id = detainee.id, "detainee registered");
    start_session(
        &config,
        StatusCode::CREATED,
        "Detainee registered successfully",
        detainee.id,
        AuthUser::from(&detainee),
    )
}

#[utoipa::path(
    post,
    path = "/lawyer/signup",
    request_body = LawyerSignupRequest,
    responses(
        (status = 201, description = "Lawyer registered", body = AuthResponse),
        (status = 400, description = "Invalid or duplicate details", body = AppError)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all, fields(username = %body.username, lawyer_id = body.lawyer_id))]
pub async fn lawyer_signup(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    ApiJson(body): ApiJson<LawyerSignupRequest>,
) -> Result<SessionReply, AppError> {
    body.validate_request()?;

    if repo::lawyer::find_by_email(&pool, &body.email).await?.is_some() {
        return Err(already_registered("Email"));
    }
    if repo::lawyer::find_by_username(&pool, &body.username).await?.is_some() {
        return Err(already_registered("Username"));
    }
    if repo::lawyer::find_by_lawyer_id(&pool, body.lawyer_id).await?.is_some() {
        return Err(already_registered("Lawyer ID"));
    }

    let password_hash = hash_password(&body.password)?;
    let lawyer = repo::lawyer::create(
        &pool,
        repo::lawyer::NewLawyer {
            lawyer_id: body.lawyer_id,
            name: body.name.trim(),
            address: body.address.trim(),
            email: body.email.trim(),
            username: body.username.trim(),
            password_hash: &password_hash,
        },
    )
    .await?;

    tracing::info!("lawyer registered");
    start_session(
        &config,
        StatusCode::CREATED,
        "Lawyer registered successfully",
        lawyer.lawyer_id,
        AuthUser::from(&lawyer),
    )
}

#[utoipa::path(
    post,
    path = "/judge/signup",
    request_body = JudgeSignupRequest,
    responses(
        (status = 201, description = "Judge registered", body = AuthResponse),
        (status = 400, description = "Invalid or duplicate details", body = AppError)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all, fields(username = %body.username, judge_id = body.judge_id))]
pub async fn judge_signup(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    ApiJson(body): ApiJson<JudgeSignupRequest>,
) -> Result<SessionReply, AppError> {
    body.validate_request()?;

    if repo::judge::find_by_email(&pool, &body.email).await?.is_some() {
        return Err(already_registered("Email"));
    }
    if repo::judge::find_by_username(&pool, &body.username).await?.is_some() {
        return Err(already_registered("Username"));
    }
    if repo::judge::find_by_judge_id(&pool, body.judge_id).await?.is_some() {
        return Err(already_registered("Judge ID"));
    }

    let password_hash = hash_password(&body.password)?;
    let judge = repo::judge::create(
        &pool,
        repo::judge::NewJudge {
            judge_id: body.judge_id,
            name: body.name.trim(),
            address: body.address.trim(),
            email: body.email.trim(),
            username: body.username.trim(),
            password_hash: &password_hash,
        },
    )
    .await?;

    tracing::info!("judge registered");
    start_session(
        &config,
        StatusCode::CREATED,
        "Judge registered successfully",
        judge.judge_id,
        AuthUser::from(&judge),
    )
}

// ── Login ───────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/detainee/login",
    request_body = DetaineeLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Wrong password", body = AppError),
        (status = 404, description = "Unknown detainee", body = AppError)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all)]
pub async fn detainee_login(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    ApiJson(body): ApiJson<DetaineeLoginRequest>,
) -> Result<SessionReply, AppError> {
    let identifier = body.email_or_username.trim();
    if identifier.is_empty() || body.password.is_empty() {
        return Err(AppError::bad_request("Email or username and password are required"));
    }

    let detainee = repo::detainee::find_by_login(&pool, identifier)
        .await?
        .ok_or_else(|| AppError::not_found("Detainee not found"))?;

    if !verify_password(&body.password, &detainee.password_hash)? {
        tracing::warn!(username = %detainee.username, "detainee login with wrong password");
        return Err(invalid_credentials());
    }

    start_session(
        &config,
        StatusCode::OK,
        "Login successful",
        detainee.id,
        AuthUser::from(&detainee),
    )
}

#[utoipa::path(
    post,
    path = "/lawyer/login",
    request_body = LawyerLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Wrong password", body = AppError),
        (status = 404, description = "Unknown lawyer", body = AppError)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all)]
pub async fn lawyer_login(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    ApiJson(body): ApiJson<LawyerLoginRequest>,
) -> Result<SessionReply, AppError> {
    if body.username_or_lawyer_id.is_blank() || body.password.is_empty() {
        return Err(AppError::bad_request("Username or lawyer ID and password are required"));
    }

    let lawyer = repo::lawyer::find_by_login(&pool, &body.username_or_lawyer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Lawyer not found"))?;

    if !verify_password(&body.password, &lawyer.password_hash)? {
        tracing::warn!(username = %lawyer.username, "lawyer login with wrong password");
        return Err(invalid_credentials());
    }

    start_session(
        &config,
        StatusCode::OK,
        "Login successful",
        lawyer.lawyer_id,
        AuthUser::from(&lawyer),
    )
}

#[utoipa::path(
    post,
    path = "/judge/login",
    request_body = JudgeLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Wrong password", body = AppError),
        (status = 404, description = "Unknown judge", body = AppError)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all)]
pub async fn judge_login(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    ApiJson(body): ApiJson<JudgeLoginRequest>,
) -> Result<SessionReply, AppError> {
    if body.judge_id_or_username.is_blank() || body.password.is_empty() {
        return Err(AppError::bad_request("Judge ID or username and password are required"));
    }

    let judge = repo::judge::find_by_login(&pool, &body.judge_id_or_username)
        .await?
        .ok_or_else(|| AppError::not_found("Judge not found"))?;

    if !verify_password(&body.password, &judge.password_hash)? {
        tracing::warn!(username = %judge.username, "judge login with wrong password");
        return Err(invalid_credentials());
    }

    start_session(
        &config,
        StatusCode::OK,
        "Login successful",
        judge.judge_id,
        AuthUser::from(&judge),
    )
}

// ── Session maintenance ─────────────────────────────────────────────

/// POST /{role}/logout
#[utoipa::path(
    post,
    path = "/{role}/logout",
    params(("role" = String, Path, description = "detainee, lawyer or judge")),
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(config): State<Arc<AppConfig>>,
) -> Result<([(HeaderName, HeaderValue); 1], Json<MessageResponse>), AppError> {
    let cookie = cookies::build_clear_cookie(config.server.is_production())?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// GET /auth/refresh
#[utoipa::path(
    get,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Short-lived replacement token", body = RefreshResponse),
        (status = 401, description = "Missing or expired token", body = AppError),
        (status = 403, description = "Invalid token", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn refresh(
    State(config): State<Arc<AppConfig>>,
    AuthRequired(claims): AuthRequired,
) -> Result<Json<RefreshResponse>, AppError> {
    let ttl = Duration::minutes(config.auth.refresh_ttl_minutes);
    let token = jwt::create_token(
        &config.auth.jwt_secret,
        claims.id,
        &claims.email,
        &claims.username,
        claims.role,
        ttl,
    )
    .map_err(|e| AppError::internal(format!("token signing failed: {e}")))?;

    let fresh = jwt::validate_token(&config.auth.jwt_secret, &token).map_err(AppError::from)?;
    Ok(Json(RefreshResponse {
        user: fresh.token_user(),
        token,
    }))
}

/// GET /auth/me
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Identity carried by the presented token", body = TokenUser),
        (status = 401, description = "Not signed in", body = AppError)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(AuthRequired(claims): AuthRequired) -> Json<TokenUser> {
    Json(claims.token_user())
}
