use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::middleware::auth_middleware;
use crate::db::AppState;
use crate::openapi;

/// CORS for the configured browser origin, or any origin when unset.
///
/// A configured origin also allows credentials so the `token` cookie
/// travels with cross-site requests.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };
    match origin.trim().parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => {
            tracing::warn!(origin, "ignoring unparsable CORS origin");
            CorsLayer::new()
        }
    }
}

/// Full application router: REST API, docs and health behind the auth
/// interceptor, request ids, tracing and CORS.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    openapi::api_router(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(axum::middleware::from_fn_with_state(
            config.clone(),
            auth_middleware,
        ))
        .layer(cors_layer(config.server.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
