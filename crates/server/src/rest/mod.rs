pub mod auth;
pub mod case;
pub mod detainee;
pub mod judge;
pub mod lawyer;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::db::AppState;

/// Build the REST API router.
///
/// Parameters at the same position must share a name; handlers read them
/// by position.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Sessions
        .route("/detainee/signup", post(auth::detainee_signup))
        .route("/detainee/login", post(auth::detainee_login))
        .route("/detainee/logout", post(auth::logout))
        .route("/lawyer/signup", post(auth::lawyer_signup))
        .route("/lawyer/login", post(auth::lawyer_login))
        .route("/lawyer/logout", post(auth::logout))
        .route("/judge/signup", post(auth::judge_signup))
        .route("/judge/login", post(auth::judge_login))
        .route("/judge/logout", post(auth::logout))
        .route("/auth/refresh", get(auth::refresh))
        .route("/auth/me", get(auth::me))
        // Cases
        .route("/case/register", post(case::register_case))
        .route("/case/{key}", get(case::get_case))
        .route("/case/{key}/history", get(case::case_history))
        .route("/case/{key}/{caseid}/process-case", post(case::process_case))
        // Detainee
        .route("/detainee/{id}/raise-bail", patch(detainee::raise_bail))
        .route("/detainee/ongoing/{username}", get(detainee::ongoing_cases))
        .route("/detainee/decided/{username}", get(detainee::decided_cases))
        // Lawyer
        .route("/lawyer/{id}/ongoing-cases", get(lawyer::ongoing_cases))
        .route("/lawyer/{id}/forward-to-judge", patch(lawyer::forward_to_judge))
        .route("/lawyer/bail-appeals/{lawyerid}", get(lawyer::bail_appeals))
        .route("/lawyer/pending-bails/{lawyerid}", get(lawyer::pending_bails))
        // Judge
        .route("/judge/cases/{username}", get(judge::assigned_cases))
        .route("/judge/bail-appeals/{username}", get(judge::bail_appeals))
        .route("/judge/decided-cases/{username}", get(judge::decided_cases))
        .route("/judge/bail-decision", post(judge::bail_decision))
}
