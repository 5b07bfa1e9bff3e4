//! LLM-backed classifier implementation.
//!
//! One `LlmClassifier` wraps a reusable LLM runner plus a topic
//! instruction. The classifier is stateless between calls; each call is a
//! fresh session against the model. The verdict's `classifier_type` and
//! `model_name` come from the classifier itself, never from the model
//! output, so a confused reply cannot misattribute a verdict.

use async_trait::async_trait;
use serde::Deserialize;

use crate::classification::prompts::{CORRUPTION_INSTRUCTION, HURRICANE_RELIEF_INSTRUCTION};
use crate::classification::Classifier;
use crate::config::LlmSettings;
use crate::error::{PipelineError, Result};
use crate::llm::{extract_json_object, LlmClient};
use crate::models::{ClassificationInput, ClassificationResult, ClassifierType};

/// Shape the model is asked to return. Identity fields are deliberately
/// absent; they are stamped on by the classifier.
#[derive(Debug, Deserialize)]
struct WireVerdict {
    is_relevant: bool,
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    key_entities: Vec<String>,
}

pub struct LlmClassifier {
    client: LlmClient,
    classifier_type: ClassifierType,
    instruction: &'static str,
    name: &'static str,
}

impl LlmClassifier {
    pub fn corruption(settings: &LlmSettings) -> Self {
        Self {
            client: LlmClient::new(settings, settings.classification_model.clone()),
            classifier_type: ClassifierType::Corruption,
            instruction: CORRUPTION_INSTRUCTION,
            name: "corruption_classifier",
        }
    }

    pub fn hurricane_relief(settings: &LlmSettings) -> Self {
        Self {
            client: LlmClient::new(settings, settings.classification_model.clone()),
            classifier_type: ClassifierType::HurricaneRelief,
            instruction: HURRICANE_RELIEF_INSTRUCTION,
            name: "hurricane_relief_classifier",
        }
    }

    fn build_prompt(&self, article: &ClassificationInput) -> String {
        let published = article
            .published_date
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "Unknown".to_string());

        format!(
            "Analyze this Jamaican news article:\n\n\
             **Article Details:**\n\
             - Title: {title}\n\
             - URL: {url}\n\
             - Section: {section}\n\
             - Published: {published}\n\n\
             **Full Text:**\n\
             {full_text}\n\n\
             Return your classification as a valid JSON object.",
            title = article.title,
            url = article.url,
            section = article.section,
            full_text = article.full_text,
        )
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    fn name(&self) -> &str {
        self.name
    }

    async fn classify(&self, article: &ClassificationInput) -> Result<ClassificationResult> {
        let prompt = self.build_prompt(article);
        let response = self.client.chat(self.instruction, &prompt).await?;

        let json = extract_json_object(&response)?;
        let verdict: WireVerdict = serde_json::from_value(json).map_err(|e| {
            PipelineError::Classifier {
                classifier: self.name.to_string(),
                message: format!("response did not match verdict schema: {e}"),
            }
        })?;

        ClassificationResult::new(
            verdict.is_relevant,
            verdict.confidence,
            verdict.reasoning,
            verdict.key_entities,
            self.classifier_type,
            self.client.model(),
        )
        .map_err(|e| PipelineError::Classifier {
            classifier: self.name.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> LlmSettings {
        LlmSettings {
            api_key: "test-key".to_string(),
            base_url,
            classification_model: "test-model".to_string(),
            normalization_model: "test-model".to_string(),
        }
    }

    fn input() -> ClassificationInput {
        ClassificationInput::new(
            "https://example.test/news/ocg-probe",
            "OCG Probes Ministry",
            "news",
            "The Office of the Contractor General has launched a probe into irregularities.",
            None,
        )
        .unwrap()
    }

    fn llm_reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "content": [{"type": "text", "text": text}]
        })
    }

    #[tokio::test]
    async fn parses_valid_verdict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply(
                r#"{"is_relevant": true, "confidence": 0.9,
                    "reasoning": "OCG investigation into ministry contracts",
                    "key_entities": ["OCG", "Ministry of Education"]}"#,
            )))
            .mount(&server)
            .await;

        let classifier = LlmClassifier::corruption(&settings(server.uri()));
        let result = classifier.classify(&input()).await.unwrap();

        assert!(result.is_relevant);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.classifier_type, ClassifierType::Corruption);
        assert_eq!(result.model_name, "test-model");
        assert_eq!(result.key_entities, vec!["OCG", "Ministry of Education"]);
    }

    #[tokio::test]
    async fn rejects_out_of_range_confidence() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply(
                r#"{"is_relevant": true, "confidence": 1.4, "reasoning": "r"}"#,
            )))
            .mount(&server)
            .await;

        let classifier = LlmClassifier::corruption(&settings(server.uri()));
        let err = classifier.classify(&input()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Classifier { .. }));
    }

    #[tokio::test]
    async fn rejects_non_json_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(llm_reply("I cannot classify this.")),
            )
            .mount(&server)
            .await;

        let classifier = LlmClassifier::corruption(&settings(server.uri()));
        assert!(classifier.classify(&input()).await.is_err());
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let classifier = LlmClassifier::hurricane_relief(&settings(server.uri()));
        let err = classifier.classify(&input()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Llm(_)));
    }
}
