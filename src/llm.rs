//! Minimal LLM client speaking the Anthropic Messages API.
//!
//! Classifiers and the entity normalizer each hold one [`LlmClient`] for
//! the life of the process; every call is a fresh logical session (no
//! conversation state is carried between calls).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::LlmSettings;
use crate::error::{PipelineError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl ChatResponse {
    fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
    }
}

/// Reusable LLM runner.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single-turn completion. Temperature is kept low; classification and
    /// normalization both require same-input-same-output behavior.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system,
            messages: vec![WireMessage {
                role: "user",
                content: user,
            }],
        };

        debug!(model = %self.model, "LLM chat request");

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Llm(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Llm(format!(
                "API error ({status}): {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Llm(format!("malformed response: {e}")))?;

        parsed
            .text()
            .map(|t| t.to_string())
            .ok_or_else(|| PipelineError::Llm("no text block in response".to_string()))
    }
}

/// Extract the first JSON object from an LLM reply.
///
/// Models occasionally wrap JSON in markdown fences or prose despite the
/// prompt; the boundary parser tolerates that, but nothing else.
pub fn extract_json_object(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();

    let candidate = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        let start = trimmed
            .find('{')
            .ok_or_else(|| PipelineError::Llm("no JSON object in response".to_string()))?;
        let end = trimmed
            .rfind('}')
            .ok_or_else(|| PipelineError::Llm("unterminated JSON object in response".to_string()))?;
        if end < start {
            return Err(PipelineError::Llm(
                "unterminated JSON object in response".to_string(),
            ));
        }
        trimmed[start..=end].to_string()
    };

    serde_json::from_str(&candidate)
        .map_err(|e| PipelineError::Llm(format!("invalid JSON in response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_json() {
        let value = extract_json_object(r#"{"is_relevant": true}"#).unwrap();
        assert_eq!(value["is_relevant"], Value::Bool(true));
    }

    #[test]
    fn extracts_fenced_json() {
        let raw = "```json\n{\"confidence\": 0.9}\n```";
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value["confidence"], 0.9);
    }

    #[test]
    fn extracts_json_with_prose() {
        let raw = "Here is the classification:\n{\"is_relevant\": false}\nDone.";
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value["is_relevant"], Value::Bool(false));
    }

    #[test]
    fn rejects_non_json() {
        assert!(extract_json_object("no json here").is_err());
    }
}
