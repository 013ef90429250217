use serde::Deserialize;
use serde_json::Value;
use shared_types::{AiConfig, AppError};
use std::time::Duration;

/// Client for the external bail-recommendation service.
#[derive(Clone, Debug)]
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
}

/// Reply from `POST /find-similar-cases`. Unknown fields are ignored and
/// missing ones default, matching how loosely the service is specified.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarCasesReply {
    #[serde(default)]
    pub ai_assistance: Option<Value>,
    #[serde(default)]
    pub bail_decision: Option<Value>,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub similar_cases: Vec<Value>,
}

/// Anything other than an array is treated as no similar cases.
fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

impl AiClient {
    pub fn new(config: &AiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| AppError::internal(format!("failed to build AI client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the service for cases similar to `payload` and a recommendation.
    pub async fn find_similar_cases(&self, payload: &Value) -> Result<SimilarCasesReply, AppError> {
        let url = format!("{}/find-similar-cases", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%url, error = %e, "AI service unreachable");
                AppError::upstream("AI service is unavailable")
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "AI service returned an error");
            return Err(AppError::upstream(format!(
                "AI service responded with status {}",
                status.as_u16()
            )));
        }

        response.json::<SimilarCasesReply>().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "AI service returned an unreadable body");
            AppError::upstream("AI service returned an invalid response")
        })
    }
}
