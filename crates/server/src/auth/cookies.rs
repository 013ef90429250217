use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};
use shared_types::AppError;

/// Name of the session cookie set at signup and login.
pub const TOKEN_COOKIE: &str = "token";

fn base_cookie(value: &str, production: bool) -> cookie::CookieBuilder<'static> {
    let same_site = if production { SameSite::None } else { SameSite::Lax };
    Cookie::build((TOKEN_COOKIE, value.to_string()))
        .http_only(true)
        .path("/")
        .same_site(same_site)
        .secure(production)
}

fn to_header(cookie: Cookie<'_>) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AppError::internal(format!("invalid cookie header: {e}")))
}

/// Build the Set-Cookie value carrying a freshly issued token.
pub fn build_token_cookie(
    token: &str,
    max_age: chrono::Duration,
    production: bool,
) -> Result<HeaderValue, AppError> {
    let cookie = base_cookie(token, production)
        .max_age(cookie::time::Duration::seconds(max_age.num_seconds()))
        .build();
    to_header(cookie)
}

/// Build the Set-Cookie value that removes the session cookie.
pub fn build_clear_cookie(production: bool) -> Result<HeaderValue, AppError> {
    let cookie = base_cookie("", production)
        .max_age(cookie::time::Duration::ZERO)
        .build();
    to_header(cookie)
}

/// Token from the `Authorization: Bearer` header, falling back to the cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match bearer {
        Some(token) => Some(token.to_string()),
        None => extract_cookie(headers, TOKEN_COOKIE).filter(|t| !t.is_empty()),
    }
}

/// Parse a specific cookie value from the Cookie header.
fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|piece| Cookie::parse(piece.trim().to_string()).ok())
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}
