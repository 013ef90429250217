use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::identity::IdOrText;
use crate::models::UserRole;


// ── Bail lifecycle ──────────────────────────────────────────────────

/// Where a case sits in the bail-review pipeline.
///
/// Serialized as the exact strings stored in the `cases.bail_status`
/// column; the empty string is the initial, unraised state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum BailStatus {
    #[default]
    #[serde(rename = "")]
    Unraised,
    #[serde(rename = "Pending to lawyer")]
    PendingToLawyer,
    #[serde(rename = "Pending to judge")]
    PendingToJudge,
    #[serde(rename = "Accepted")]
    Accepted,
    #[serde(rename = "Declined")]
    Declined,
}

impl BailStatus {
    pub const ALL: [BailStatus; 5] = [
        BailStatus::Unraised,
        BailStatus::PendingToLawyer,
        BailStatus::PendingToJudge,
        BailStatus::Accepted,
        BailStatus::Declined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BailStatus::Unraised => "",
            BailStatus::PendingToLawyer => "Pending to lawyer",
            BailStatus::PendingToJudge => "Pending to judge",
            BailStatus::Accepted => "Accepted",
            BailStatus::Declined => "Declined",
        }
    }

    /// Exact-match parse of a stored status string.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BailStatus::Accepted | BailStatus::Declined)
    }

    /// Apply `event` under the strict transition table.
    pub fn apply(self, event: BailEvent) -> Result<BailStatus, TransitionError> {
        Lifecycle::STRICT.next(self, event)
    }
}

impl fmt::Display for BailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BailStatus::Unraised => f.write_str("unraised"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// An action that moves a case between bail states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BailEvent {
    /// Detainee asks their lawyer to pursue bail.
    RaiseBail,
    /// Lawyer sends the bail application to the judge.
    ForwardToJudge,
    Accept,
    Decline,
}

impl BailEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            BailEvent::RaiseBail => "raise_bail",
            BailEvent::ForwardToJudge => "forward_to_judge",
            BailEvent::Accept => "accept",
            BailEvent::Decline => "decline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "raise_bail" => Some(BailEvent::RaiseBail),
            "forward_to_judge" => Some(BailEvent::ForwardToJudge),
            "accept" => Some(BailEvent::Accept),
            "decline" => Some(BailEvent::Decline),
            _ => None,
        }
    }

    /// The only role allowed to trigger this event.
    pub fn actor(&self) -> UserRole {
        match self {
            BailEvent::RaiseBail => UserRole::Detainee,
            BailEvent::ForwardToJudge => UserRole::Lawyer,
            BailEvent::Accept | BailEvent::Decline => UserRole::Judge,
        }
    }
}

impl fmt::Display for BailEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition that is not in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: BailStatus,
    pub event: BailEvent,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot {} a case whose bail status is {}",
            self.event.as_str().replace('_', " "),
            self.from
        )
    }
}

impl std::error::Error for TransitionError {}

/// from × event → to. Anything absent is rejected.
const TRANSITIONS: &[(BailStatus, BailEvent, BailStatus)] = &[
    (BailStatus::Unraised, BailEvent::RaiseBail, BailStatus::PendingToLawyer),
    (BailStatus::Unraised, BailEvent::ForwardToJudge, BailStatus::PendingToJudge),
    (BailStatus::PendingToLawyer, BailEvent::ForwardToJudge, BailStatus::PendingToJudge),
    (BailStatus::PendingToJudge, BailEvent::Accept, BailStatus::Accepted),
    (BailStatus::PendingToJudge, BailEvent::Decline, BailStatus::Declined),
];

/// Extra rows enabled by `allow_redecision`: a judge may overturn a decision.
const REDECISIONS: &[(BailStatus, BailEvent, BailStatus)] = &[
    (BailStatus::Accepted, BailEvent::Accept, BailStatus::Accepted),
    (BailStatus::Accepted, BailEvent::Decline, BailStatus::Declined),
    (BailStatus::Declined, BailEvent::Accept, BailStatus::Accepted),
    (BailStatus::Declined, BailEvent::Decline, BailStatus::Declined),
];

/// The transition table in force for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lifecycle {
    allow_redecision: bool,
}

impl Lifecycle {
    pub const STRICT: Lifecycle = Lifecycle {
        allow_redecision: false,
    };

    pub fn new(allow_redecision: bool) -> Self {
        Self { allow_redecision }
    }

    pub fn allows_redecision(&self) -> bool {
        self.allow_redecision
    }

    pub fn next(&self, from: BailStatus, event: BailEvent) -> Result<BailStatus, TransitionError> {
        let extra: &[_] = if self.allow_redecision { REDECISIONS } else { &[] };
        TRANSITIONS
            .iter()
            .chain(extra)
            .find(|(f, e, _)| *f == from && *e == event)
            .map(|(_, _, to)| *to)
            .ok_or(TransitionError { from, event })
    }
}

/// A judge's ruling on a bail application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BailDecision {
    Accepted,
    Declined,
}

impl BailDecision {
    /// Exactly `Accepted` or `Declined`; anything else is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Accepted" => Some(BailDecision::Accepted),
            "Declined" => Some(BailDecision::Declined),
            _ => None,
        }
    }

    pub fn event(&self) -> BailEvent {
        match self {
            BailDecision::Accepted => BailEvent::Accept,
            BailDecision::Declined => BailEvent::Decline,
        }
    }
}

/// Split a comma-separated comment string into trimmed, non-empty entries.
pub fn parse_comments(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode a JSON list column, treating malformed content as empty.
pub fn decode_json_list<T: serde::de::DeserializeOwned>(raw: &str) -> Vec<T> {
    serde_json::from_str(raw).unwrap_or_default()
}

// ── DB row structs ──────────────────────────────────────────────────

/// A case record as stored. List and map fields are JSON text columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct CaseRecord {
    pub id: i64,
    pub case_id: String,
    pub case_title: String,
    pub bns_sections: String,
    pub bail_status: String,
    pub court_name: String,
    pub judge_id: i64,
    pub judge_name: String,
    pub judge_username: String,
    pub lawyer_id: i64,
    pub lawyer_name: String,
    pub lawyer_username: String,
    pub detainee_username: Option<String>,
    pub detainee_name: Option<String>,
    pub filing_date: NaiveDate,
    pub hearing_dates: String,
    pub police_station: String,
    pub case_summary: String,
    pub bail_filing_date: Option<DateTime<Utc>>,
    pub grounds_of_bail: String,
    pub judge_comments: String,
    pub severity_of_offence: Option<String>,
    pub ai_recommendation: String,
    pub case_points: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CaseRecord {
    /// Stored status; the column's CHECK constraint keeps this total.
    pub fn status(&self) -> BailStatus {
        BailStatus::parse(&self.bail_status).unwrap_or_default()
    }
}

/// One lifecycle transition, as stored in the `case_events` log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct CaseEvent {
    pub id: i64,
    pub case_id: String,
    pub from_status: String,
    pub to_status: String,
    pub event: String,
    pub actor_role: String,
    pub actor_username: String,
    pub comments: String,
    pub created_at: DateTime<Utc>,
}

// ── API response types ──────────────────────────────────────────────

/// API response shape for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CaseResponse {
    pub case_id: String,
    pub case_title: String,
    pub bns_sections: Vec<String>,
    pub bail_status: BailStatus,
    pub court_name: String,
    pub judge_id: i64,
    pub judge_name: String,
    pub judge_username: String,
    pub lawyer_id: i64,
    pub lawyer_name: String,
    pub lawyer_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detainee_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detainee_name: Option<String>,
    pub filing_date: NaiveDate,
    pub hearing_dates: Vec<NaiveDate>,
    pub police_station: String,
    pub case_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bail_filing_date: Option<String>,
    pub grounds_of_bail: Vec<String>,
    pub judge_comments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_of_offence: Option<String>,
    pub ai_recommendation: String,
    pub case_points: BTreeMap<String, String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CaseRecord> for CaseResponse {
    fn from(c: CaseRecord) -> Self {
        Self {
            bail_status: c.status(),
            bns_sections: decode_json_list(&c.bns_sections),
            hearing_dates: decode_json_list(&c.hearing_dates),
            grounds_of_bail: decode_json_list(&c.grounds_of_bail),
            judge_comments: decode_json_list(&c.judge_comments),
            case_points: serde_json::from_str(&c.case_points).unwrap_or_default(),
            case_id: c.case_id,
            case_title: c.case_title,
            court_name: c.court_name,
            judge_id: c.judge_id,
            judge_name: c.judge_name,
            judge_username: c.judge_username,
            lawyer_id: c.lawyer_id,
            lawyer_name: c.lawyer_name,
            lawyer_username: c.lawyer_username,
            detainee_username: c.detainee_username,
            detainee_name: c.detainee_name,
            filing_date: c.filing_date,
            police_station: c.police_station,
            case_summary: c.case_summary,
            bail_filing_date: c.bail_filing_date.map(|d| d.to_rfc3339()),
            severity_of_offence: c.severity_of_offence,
            ai_recommendation: c.ai_recommendation,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// API response shape for one audit-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CaseEventResponse {
    pub case_id: String,
    pub from_status: BailStatus,
    pub to_status: BailStatus,
    pub event: String,
    pub actor_role: String,
    pub actor_username: String,
    pub comments: Vec<String>,
    pub created_at: String,
}

impl From<CaseEvent> for CaseEventResponse {
    fn from(e: CaseEvent) -> Self {
        Self {
            from_status: BailStatus::parse(&e.from_status).unwrap_or_default(),
            to_status: BailStatus::parse(&e.to_status).unwrap_or_default(),
            comments: decode_json_list(&e.comments),
            case_id: e.case_id,
            event: e.event,
            actor_role: e.actor_role,
            actor_username: e.actor_username,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Response of `POST /case/{entity}/{caseid}/process-case`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProcessCaseResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub ai_assistance: Option<serde_json::Value>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub bail_decision: Option<serde_json::Value>,
    pub current_case: CaseResponse,
    /// Local case documents merged with their similarity score; upstream
    /// entries with no local match are passed through as received.
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    pub similar_cases: Vec<serde_json::Value>,
}

// ── Request types ───────────────────────────────────────────────────

/// Bail-relevant facts collected at registration and forwarded to the
/// AI service as `casePoints`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BailFactors {
    pub crime_type: Option<String>,
    pub alleged_role: Option<String>,
    pub accused_age: Option<u32>,
    pub days_in_detention: Option<u32>,
    pub medical_conditions: Option<String>,
    pub has_permanent_address: Option<bool>,
    pub is_employed: Option<bool>,
    pub owns_property: Option<bool>,
    pub has_local_family: Option<bool>,
    pub is_sole_family_earner: Option<bool>,
    pub has_prior_record: Option<bool>,
    #[serde(default)]
    pub prior_conviction_sections: Vec<String>,
    pub history_of_violence: Option<bool>,
    pub holds_passport: Option<bool>,
    pub has_financial_means_to_travel: Option<bool>,
    pub alleged_organized_crime_links: Option<bool>,
    #[serde(default)]
    pub available_evidence: Vec<String>,
    pub witness_threats: Option<bool>,
    pub evidence_tampering: Option<bool>,
}

impl BailFactors {
    /// Flatten into the string map the AI service expects. Absent facts are
    /// omitted, except medical conditions which read "None reported".
    pub fn to_case_points(&self, bns_sections: &[String]) -> BTreeMap<String, String> {
        let mut points = BTreeMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                points.insert(key.to_string(), v);
            }
        };
        let flag = |b: Option<bool>| b.map(|v| v.to_string());
        let list = |items: &[String]| (!items.is_empty()).then(|| items.join(", "));

        put("bnsSections", list(bns_sections));
        put("crimeType", self.crime_type.clone());
        put("accusedAge", self.accused_age.map(|v| v.to_string()));
        put("daysInDetention", self.days_in_detention.map(|v| v.to_string()));
        put("hasPriorRecord", flag(self.has_prior_record));
        put("priorConvictionSections", list(&self.prior_conviction_sections));
        put("hasPermanentAddress", flag(self.has_permanent_address));
        put("ownsProperty", flag(self.owns_property));
        put("isEmployed", flag(self.is_employed));
        put("hasLocalFamily", flag(self.has_local_family));
        put("holdsPassport", flag(self.holds_passport));
        put("hasFinancialMeansToTravel", flag(self.has_financial_means_to_travel));
        put("availableEvidence", list(&self.available_evidence));
        put("witnessThreatReports", flag(self.witness_threats));
        put("evidenceTamperingReports", flag(self.evidence_tampering));
        put("allegedOrganizedCrimeLinks", flag(self.alleged_organized_crime_links));
        put("historyOfViolence", flag(self.history_of_violence));
        put(
            "medicalConditions",
            Some(
                self.medical_conditions
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "None reported".to_string()),
            ),
        );
        put("isSoleFamilyEarner", flag(self.is_sole_family_earner));
        put("allegedRoleInCrime", self.alleged_role.clone());
        points
    }
}

/// POST /case/register
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
#[serde(rename_all = "camelCase")]
pub struct RegisterCaseRequest {
    /// Caller-assigned id; a random one is generated when omitted.
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 64, message = "Case ID must be 1 to 64 characters"))
    )]
    pub case_id: Option<String>,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Case title is required"))
    )]
    pub case_title: String,
    #[serde(default)]
    pub bns_sections: Vec<IdOrText>,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Court name is required"))
    )]
    pub court_name: String,
    pub filing_date: NaiveDate,
    #[serde(default)]
    pub hearing_dates: Vec<NaiveDate>,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Police station is required"))
    )]
    pub police_station: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 250, message = "Case Summary must be at least 250 characters."))
    )]
    pub case_summary: String,
    pub judge_id: IdOrText,
    /// Required. Optional here so a missing id is a 400 naming the field.
    #[serde(default)]
    pub lawyer_id: Option<IdOrText>,
    #[serde(default)]
    pub detainee_username: Option<String>,
    #[serde(default)]
    pub grounds_of_bail: Vec<String>,
    #[serde(default)]
    pub severity_of_offence: Option<String>,
    #[serde(flatten)]
    pub factors: BailFactors,
}

/// POST /judge/bail-decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BailDecisionRequest {
    pub case_id: String,
    /// Exactly `Accepted` or `Declined`.
    pub status: String,
    /// Comma-separated; replaces any earlier comments on the case.
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub ai_recommendation: Option<String>,
}
