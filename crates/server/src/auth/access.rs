//! Declarative route access rules.
//!
//! Every protected route is listed once with the roles that may call it.
//! The auth middleware consults this table before any handler runs.

use axum::http::Method;
use shared_types::{AppError, UserRole};

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any signed-in user, whatever the role.
    Authenticated,
    Roles(&'static [UserRole]),
}

impl Access {
    pub fn is_public(&self) -> bool {
        matches!(self, Access::Public)
    }

    /// Decide whether a caller with `role` (or no session) may proceed.
    pub fn check(&self, role: Option<UserRole>) -> Result<(), AppError> {
        match (self, role) {
            (Access::Public, _) => Ok(()),
            (_, None) => Err(AppError::unauthorized("Authentication required")),
            (Access::Authenticated, Some(_)) => Ok(()),
            (Access::Roles(allowed), Some(role)) if allowed.contains(&role) => Ok(()),
            (Access::Roles(allowed), Some(role)) => Err(AppError::forbidden(format!(
                "Access denied: requires {} role, signed in as {}",
                allowed
                    .iter()
                    .map(UserRole::as_str)
                    .collect::<Vec<_>>()
                    .join(" or "),
                role
            ))),
        }
    }
}

const DETAINEE: &[UserRole] = &[UserRole::Detainee];
const LAWYER: &[UserRole] = &[UserRole::Lawyer];
const JUDGE: &[UserRole] = &[UserRole::Judge];
const COUNSEL_OR_BENCH: &[UserRole] = &[UserRole::Lawyer, UserRole::Judge];

/// A route pattern: `*` matches exactly one path segment.
struct Rule {
    method: &'static str,
    pattern: &'static str,
    access: Access,
}

const fn rule(method: &'static str, pattern: &'static str, access: Access) -> Rule {
    Rule {
        method,
        pattern,
        access,
    }
}

/// First match wins; unlisted routes are public and fall through to the
/// router, which answers 404 for anything it does not know.
static RULES: &[Rule] = &[
    // Sessions
    rule("POST", "/*/signup", Access::Public),
    rule("POST", "/*/login", Access::Public),
    rule("POST", "/*/logout", Access::Public),
    rule("GET", "/auth/refresh", Access::Authenticated),
    rule("GET", "/auth/me", Access::Authenticated),
    // Cases
    rule("POST", "/case/register", Access::Roles(COUNSEL_OR_BENCH)),
    rule("GET", "/case/*", Access::Authenticated),
    rule("GET", "/case/*/history", Access::Authenticated),
    rule("POST", "/case/*/*/process-case", Access::Authenticated),
    // Detainee
    rule("PATCH", "/detainee/*/raise-bail", Access::Roles(DETAINEE)),
    rule("GET", "/detainee/ongoing/*", Access::Roles(DETAINEE)),
    rule("GET", "/detainee/decided/*", Access::Roles(DETAINEE)),
    // Lawyer
    rule("GET", "/lawyer/*/ongoing-cases", Access::Roles(LAWYER)),
    rule("GET", "/lawyer/bail-appeals/*", Access::Roles(LAWYER)),
    rule("GET", "/lawyer/pending-bails/*", Access::Roles(LAWYER)),
    rule("PATCH", "/lawyer/*/forward-to-judge", Access::Roles(LAWYER)),
    // Judge
    rule("GET", "/judge/cases/*", Access::Roles(JUDGE)),
    rule("GET", "/judge/bail-appeals/*", Access::Roles(JUDGE)),
    rule("GET", "/judge/decided-cases/*", Access::Roles(JUDGE)),
    rule("POST", "/judge/bail-decision", Access::Roles(JUDGE)),
];

fn matches(pattern: &str, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    let mut want = pattern.split('/');
    let mut got = path.split('/');
    loop {
        match (want.next(), got.next()) {
            (None, None) => return true,
            (Some("*"), Some(seg)) if !seg.is_empty() => {}
            (Some(w), Some(seg)) if w == seg => {}
            _ => return false,
        }
    }
}

/// Access rule for a request.
pub fn required_access(method: &Method, path: &str) -> Access {
    RULES
        .iter()
        .find(|r| r.method == method.as_str() && matches(r.pattern, path))
        .map(|r| r.access)
        .unwrap_or(Access::Public)
}
