use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "validation")]
use validator::Validate;

use crate::models::{AuthUser, UserRole};

// ── Loose id input ──────────────────────────────────────────────────

/// A value the client may send either as a JSON number or as a string.
///
/// Lawyer and judge ids arrive both ways from the forms; parsing is
/// deferred so handlers can answer 400 with a field-specific message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum IdOrText {
    Int(i64),
    Text(String),
}

impl IdOrText {
    /// Integer value, accepting strings of ASCII digits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IdOrText::Int(n) => Some(*n),
            IdOrText::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            IdOrText::Int(n) => n.to_string(),
            IdOrText::Text(s) => s.trim().to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, IdOrText::Text(s) if s.trim().is_empty())
    }
}

// ── DB row structs ──────────────────────────────────────────────────

/// A detainee account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Detainee {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A lawyer account, keyed by bar council id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Lawyer {
    pub id: i64,
    pub lawyer_id: i64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A judge account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Judge {
    pub id: i64,
    pub judge_id: i64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Detainee> for AuthUser {
    fn from(d: &Detainee) -> Self {
        Self {
            name: d.name.clone(),
            username: d.username.clone(),
            email: d.email.clone(),
            role: UserRole::Detainee,
            lawyer_id: None,
            judge_id: None,
        }
    }
}

impl From<&Lawyer> for AuthUser {
    fn from(l: &Lawyer) -> Self {
        Self {
            name: l.name.clone(),
            username: l.username.clone(),
            email: l.email.clone(),
            role: UserRole::Lawyer,
            lawyer_id: Some(l.lawyer_id),
            judge_id: None,
        }
    }
}

impl From<&Judge> for AuthUser {
    fn from(j: &Judge) -> Self {
        Self {
            name: j.name.clone(),
            username: j.username.clone(),
            email: j.email.clone(),
            role: UserRole::Judge,
            lawyer_id: None,
            judge_id: Some(j.judge_id),
        }
    }
}

// ── Signup requests ─────────────────────────────────────────────────

/// POST /detainee/signup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct DetaineeSignupRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Name is required"))
    )]
    pub name: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Address is required"))
    )]
    pub address: String,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Email must be a valid address"))
    )]
    pub email: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 3, message = "Username must be at least 3 characters"))
    )]
    pub username: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 6, message = "Password must be at least 6 characters"))
    )]
    pub password: String,
}

/// POST /lawyer/signup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
#[serde(rename_all = "camelCase")]
pub struct LawyerSignupRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Name is required"))
    )]
    pub name: String,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, message = "Lawyer ID must be a positive integer"))
    )]
    pub lawyer_id: i64,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Address is required"))
    )]
    pub address: String,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Email must be a valid address"))
    )]
    pub email: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 3, message = "Username must be at least 3 characters"))
    )]
    pub username: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 6, message = "Password must be at least 6 characters"))
    )]
    pub password: String,
}

/// POST /judge/signup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
#[serde(rename_all = "camelCase")]
pub struct JudgeSignupRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Name is required"))
    )]
    pub name: String,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, message = "Judge ID must be a positive integer"))
    )]
    pub judge_id: i64,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Address is required"))
    )]
    pub address: String,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Email must be a valid address"))
    )]
    pub email: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 3, message = "Username must be at least 3 characters"))
    )]
    pub username: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 6, message = "Password must be at least 6 characters"))
    )]
    pub password: String,
}

// ── Login requests ──────────────────────────────────────────────────

/// POST /detainee/login. An identifier containing `@` is treated as an email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DetaineeLoginRequest {
    pub email_or_username: String,
    pub password: String,
}

/// POST /lawyer/login. Matches email, username, or numeric lawyer id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LawyerLoginRequest {
    pub username_or_lawyer_id: IdOrText,
    pub password: String,
}

/// POST /judge/login. Matches username first, then numeric judge id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct JudgeLoginRequest {
    pub judge_id_or_username: IdOrText,
    pub password: String,
}
