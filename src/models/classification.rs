//! Classification-layer models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::discovery::validate_url_shape;
use crate::models::extraction::{ExtractedArticleContent, MIN_FULL_TEXT_CHARS};

/// Types of classifiers available for article analysis.
///
/// Each classifier focuses on a specific accountability topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassifierType {
    /// Corruption, contract irregularities, OCG investigations.
    Corruption,
    /// Disaster relief fund allocation and management.
    HurricaneRelief,
}

impl ClassifierType {
    /// Wire/database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corruption => "CORRUPTION",
            Self::HurricaneRelief => "HURRICANE_RELIEF",
        }
    }

    /// Lowercase prefix used for per-classifier telemetry keys.
    pub fn telemetry_prefix(&self) -> &'static str {
        match self {
            Self::Corruption => "corruption",
            Self::HurricaneRelief => "hurricane_relief",
        }
    }
}

impl std::fmt::Display for ClassifierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input data for article classifiers.
///
/// Combines extractor output with the discovery context (url, section).
/// Classification happens before storage, so there is no article id yet;
/// the URL identifies the article at this stage.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationInput {
    pub url: String,
    pub title: String,
    pub section: String,
    pub full_text: String,
    pub published_date: Option<DateTime<Utc>>,
}

impl ClassificationInput {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        section: impl Into<String>,
        full_text: impl Into<String>,
        published_date: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let url = url.into().trim().to_string();
        validate_url_shape(&url)?;

        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Title cannot be empty".to_string(),
            ));
        }

        let section = section.into().trim().to_string();
        if section.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Section cannot be empty".to_string(),
            ));
        }

        let full_text = full_text.into().trim().to_string();
        if full_text.chars().count() < MIN_FULL_TEXT_CHARS {
            return Err(PipelineError::InvalidInput(format!(
                "Full text must be at least {} characters",
                MIN_FULL_TEXT_CHARS
            )));
        }

        Ok(Self {
            url,
            title,
            section,
            full_text,
            published_date,
        })
    }

    /// Combine extracted content with discovery context.
    pub fn from_extracted(
        extracted: &ExtractedArticleContent,
        url: &str,
        section: &str,
    ) -> Result<Self> {
        Self::new(
            url,
            &extracted.title,
            section,
            &extracted.full_text,
            extracted.published_date,
        )
    }
}

/// One classifier's verdict on one article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_relevant: bool,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default)]
    pub key_entities: Vec<String>,
    pub classifier_type: ClassifierType,
    pub model_name: String,
}

impl ClassificationResult {
    pub fn new(
        is_relevant: bool,
        confidence: f64,
        reasoning: impl Into<String>,
        key_entities: Vec<String>,
        classifier_type: ClassifierType,
        model_name: impl Into<String>,
    ) -> Result<Self> {
        let mut result = Self {
            is_relevant,
            confidence,
            reasoning: reasoning.into(),
            key_entities,
            classifier_type,
            model_name: model_name.into(),
        };
        result.validate()?;
        Ok(result)
    }

    /// Normalize and check invariants in place. Also applied to results
    /// deserialized from LLM output before they escape the classifier.
    pub fn validate(&mut self) -> Result<()> {
        validate_confidence(self.confidence)?;

        self.reasoning = self.reasoning.trim().to_string();
        if self.reasoning.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Reasoning cannot be empty".to_string(),
            ));
        }

        self.model_name = self.model_name.trim().to_string();
        if self.model_name.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Model name cannot be empty".to_string(),
            ));
        }

        self.key_entities = self
            .key_entities
            .iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        Ok(())
    }
}

/// One entity string mapped to its canonical form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedEntity {
    pub original_value: String,
    pub normalized_value: String,
    pub confidence: f64,
    pub reason: String,
    #[serde(default)]
    pub context: String,
}

impl NormalizedEntity {
    pub fn new(
        original_value: impl Into<String>,
        normalized_value: impl Into<String>,
        confidence: f64,
        reason: impl Into<String>,
        context: impl Into<String>,
    ) -> Result<Self> {
        let mut entity = Self {
            original_value: original_value.into(),
            normalized_value: normalized_value.into(),
            confidence,
            reason: reason.into(),
            context: context.into(),
        };
        entity.validate()?;
        Ok(entity)
    }

    pub fn validate(&mut self) -> Result<()> {
        validate_confidence(self.confidence)?;

        self.original_value = self.original_value.trim().to_string();
        self.normalized_value = self.normalized_value.trim().to_string();
        self.reason = self.reason.trim().to_string();
        self.context = self.context.trim().to_string();

        if self.original_value.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Original value cannot be empty".to_string(),
            ));
        }
        if self.normalized_value.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Normalized value cannot be empty".to_string(),
            ));
        }
        if self.reason.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Reason cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Output schema of the entity normalization agent. The model is not
/// asked to echo its own name; the service fills it in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityNormalizationResult {
    pub normalized_entities: Vec<NormalizedEntity>,
    #[serde(default)]
    pub model_name: String,
}

fn validate_confidence(confidence: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(PipelineError::InvalidInput(format!(
            "Confidence must be between 0.0 and 1.0, got: {confidence}"
        )));
    }
    Ok(())
}

/// Keep only classifications that are relevant at or above the threshold.
///
/// An article is relevant if at least one classifier marks it
/// `is_relevant` with `confidence >= min_confidence`.
pub fn filter_relevant_classifications(
    results: &[ClassificationResult],
    min_confidence: f64,
) -> Vec<ClassificationResult> {
    results
        .iter()
        .filter(|r| r.is_relevant && r.confidence >= min_confidence)
        .cloned()
        .collect()
}
