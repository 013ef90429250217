use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use shared_types::{AppConfig, AppError};
use std::sync::Arc;

use super::access::required_access;
use super::cookies;
use super::jwt::{validate_token, TokenError};

/// Single auth interceptor for every route.
///
/// Reads the token (Bearer header, then `token` cookie), verifies it, looks
/// up the route's access rule and either rejects the request or inserts
/// the decoded `Claims` into request extensions for handlers.
///
/// On public routes a bad token is ignored rather than rejected, so a stale
/// cookie never blocks signing in again.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    let access = required_access(req.method(), req.uri().path());

    let claims = match cookies::extract_token(req.headers()) {
        None => None,
        Some(token) => match validate_token(&config.auth.jwt_secret, &token) {
            Ok(claims) => Some(claims),
            Err(e) if access.is_public() => {
                tracing::debug!(error = ?e, "ignoring bad token on public route");
                None
            }
            Err(e) => {
                tracing::warn!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    expired = e == TokenError::Expired,
                    "rejected token"
                );
                return AppError::from(e).into_response();
            }
        },
    };

    if let Err(err) = access.check(claims.as_ref().map(|c| c.role)) {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            user = claims.as_ref().map(|c| c.username.as_str()).unwrap_or("-"),
            reason = %err.message,
            "access denied"
        );
        return err.into_response();
    }

    if let Some(claims) = claims {
        req.extensions_mut().insert(claims);
    }

    next.run(req).await
}
