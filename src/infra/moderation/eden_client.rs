use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::core::moderation::{
    ExecutionHandle, JobStatus, ModerationApi, ModerationEntry, ModerationError, ModerationItem,
    ModerationReport, PollResponse,
};

/// Connection settings for the Eden AI moderation endpoints. Built once at
/// startup from the environment and injected into the client.
#[derive(Debug, Clone)]
pub struct EdenApiConfig {
    pub api_key: String,
    /// POST endpoint that accepts `{"text": ...}` and returns an execution id.
    pub submit_url: String,
    /// GET endpoint template with an `{execution_id}` placeholder.
    pub result_url_template: String,
}

/// Minimal Eden AI client. It deliberately exposes only the two calls the
/// core layer needs.
#[derive(Clone)]
pub struct EdenApiClient {
    client: Client,
    config: EdenApiConfig,
}

impl EdenApiClient {
    pub fn new(config: EdenApiConfig) -> Result<Self, ModerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|e| ModerationError::Http(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ModerationError::Http(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn result_url(&self, handle: &ExecutionHandle) -> String {
        self.config
            .result_url_template
            .replace("{execution_id}", handle.as_str())
    }

    fn parse_submit_response(body: &serde_json::Value) -> Result<ExecutionHandle, ModerationError> {
        body.get("id")
            .and_then(|id| id.as_str())
            .map(ExecutionHandle::new)
            .ok_or(ModerationError::Submission)
    }

    /// Map a raw result payload into the domain shape. Missing keys never
    /// fail here; an absent status falls through as `JobStatus::Other("")`.
    fn parse_poll_response(raw: serde_json::Value) -> PollResponse {
        let envelope: ApiEnvelope = serde_json::from_value(raw.clone()).unwrap_or_default();
        let content = envelope.content.unwrap_or_default();

        let status = JobStatus::from(content.status.as_deref().unwrap_or(""));

        let text_moderation = content
            .results
            .and_then(|r| r.text_moderation)
            .map(|section| {
                section
                    .results
                    .unwrap_or_default()
                    .into_iter()
                    .map(|entry| ModerationEntry {
                        nsfw_likelihood_score: entry.nsfw_likelihood_score.unwrap_or(0.0),
                        items: entry
                            .items
                            .unwrap_or_default()
                            .into_iter()
                            .map(|item| ModerationItem {
                                category: item.category.unwrap_or_else(|| "Unknown".to_string()),
                                likelihood_score: item.likelihood_score.unwrap_or(0.0),
                            })
                            .collect(),
                    })
                    .collect()
            });

        PollResponse {
            status,
            report: ModerationReport { text_moderation },
            raw,
        }
    }
}

#[async_trait]
impl ModerationApi for EdenApiClient {
    async fn submit_text(&self, text: &str) -> Result<ExecutionHandle, ModerationError> {
        let payload = json!({ "text": text });

        let response = self
            .client
            .post(&self.config.submit_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ModerationError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ModerationError::Http(e.to_string()))?;
            return Err(ModerationError::Http(format!(
                "submit endpoint returned {} - {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ModerationError::Decode(e.to_string()))?;

        Self::parse_submit_response(&body)
    }

    async fn fetch_result(
        &self,
        handle: &ExecutionHandle,
    ) -> Result<PollResponse, ModerationError> {
        let response = self
            .client
            .get(self.result_url(handle))
            .send()
            .await
            .map_err(|e| ModerationError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModerationError::Http(format!(
                "result endpoint returned {}",
                response.status()
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ModerationError::Decode(e.to_string()))?;

        Ok(Self::parse_poll_response(raw))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiEnvelope {
    content: Option<ApiContent>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiContent {
    status: Option<String>,
    results: Option<ApiResults>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiResults {
    #[serde(rename = "text__moderation")]
    text_moderation: Option<ApiTextModeration>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiTextModeration {
    results: Option<Vec<ApiModerationEntry>>,
}

#[derive(Debug, Deserialize)]
struct ApiModerationEntry {
    nsfw_likelihood_score: Option<f64>,
    items: Option<Vec<ApiModerationItem>>,
}

#[derive(Debug, Deserialize)]
struct ApiModerationItem {
    category: Option<String>,
    likelihood_score: Option<f64>,
}
