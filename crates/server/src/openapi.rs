use axum::Router;
use shared_types::{
    AppError, AppErrorKind, AuthResponse, AuthUser, BailDecisionRequest, BailEvent, BailFactors,
    BailStatus, CaseEventResponse, CaseResponse, DetaineeLoginRequest, DetaineeSignupRequest,
    IdOrText, JudgeLoginRequest, JudgeSignupRequest, LawyerLoginRequest, LawyerSignupRequest,
    MessageResponse, ProcessCaseResponse, RefreshResponse, RegisterCaseRequest, TokenUser,
    UserRole,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable};

use crate::db::AppState;
use crate::health;
use crate::rest;

/// Registers the `bearer` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Sessions
        rest::auth::detainee_signup,
        rest::auth::lawyer_signup,
        rest::auth::judge_signup,
        rest::auth::detainee_login,
        rest::auth::lawyer_login,
        rest::auth::judge_login,
        rest::auth::logout,
        rest::auth::refresh,
        rest::auth::me,
        // Cases
        rest::case::register_case,
        rest::case::get_case,
        rest::case::case_history,
        rest::case::process_case,
        // Detainee
        rest::detainee::raise_bail,
        rest::detainee::ongoing_cases,
        rest::detainee::decided_cases,
        // Lawyer
        rest::lawyer::ongoing_cases,
        rest::lawyer::bail_appeals,
        rest::lawyer::pending_bails,
        rest::lawyer::forward_to_judge,
        // Judge
        rest::judge::assigned_cases,
        rest::judge::bail_appeals,
        rest::judge::decided_cases,
        rest::judge::bail_decision,
        health::health_check,
    ),
    components(schemas(
        AppError, AppErrorKind, MessageResponse,
        // Identity schemas
        UserRole, AuthUser, AuthResponse, TokenUser, RefreshResponse, IdOrText,
        DetaineeSignupRequest, LawyerSignupRequest, JudgeSignupRequest,
        DetaineeLoginRequest, LawyerLoginRequest, JudgeLoginRequest,
        // Case schemas
        BailStatus, BailEvent, BailFactors, RegisterCaseRequest, CaseResponse,
        CaseEventResponse, BailDecisionRequest, ProcessCaseResponse,
        health::HealthResponse,
        health::StoreHealth,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup, login and session endpoints"),
        (name = "cases", description = "Case registration, lookup and AI assistance"),
        (name = "detainee", description = "Detainee bail requests and case views"),
        (name = "lawyer", description = "Lawyer bail applications and case views"),
        (name = "judge", description = "Judge bail decisions and case views"),
        (name = "health", description = "Health check endpoint")
    ),
    info(
        title = "JurisDict API",
        description = "Bail application and case management API",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

/// Build an Axum router that serves the API docs at `/docs`
/// alongside the REST API and `/health`.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(rest::api_router())
        .route("/health", axum::routing::get(health::health_check))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
}
