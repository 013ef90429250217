use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of account the system serves.
///
/// Carried in the token's `type` claim and matched against the access rule
/// table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Detainee,
    Lawyer,
    Judge,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Detainee, UserRole::Lawyer, UserRole::Judge];

    /// Parse from a token claim or path segment. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "detainee" => Some(UserRole::Detainee),
            "lawyer" => Some(UserRole::Lawyer),
            "judge" => Some(UserRole::Judge),
            _ => None,
        }
    }

    /// Lowercase string for token claims and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Detainee => "detainee",
            UserRole::Lawyer => "lawyer",
            UserRole::Judge => "judge",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public profile returned after signup or login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "type")]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lawyer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_id: Option<i64>,
}

/// Response body for signup and login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthResponse {
    pub message: String,
    pub user: AuthUser,
    pub token: String,
}

/// Decoded token contents as shown to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub exp: i64,
}

/// Response body for `GET /auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RefreshResponse {
    pub user: TokenUser,
    pub token: String,
}

/// Generic message response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
