//! Orchestration-layer models.

use serde::{Deserialize, Serialize};

use crate::models::classification::ClassificationResult;

/// Result of processing one article through the full pipeline.
///
/// Tracks the outcome of each stage: extract, classify, filter, store.
/// `error == None` with `stored == false` covers the two normal negative
/// outcomes (not relevant, or duplicate URL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub url: String,
    pub section: String,
    pub extracted: bool,
    pub classified: bool,
    pub relevant: bool,
    pub stored: bool,
    pub article_id: Option<i64>,
    pub classification_count: usize,
    pub classification_results: Vec<ClassificationResult>,
    pub error: Option<String>,
}

impl OrchestrationResult {
    /// Result for a stage failure: every stage from the failing one on is
    /// marked false and the error message recorded.
    pub fn failure(
        url: &str,
        section: &str,
        extracted: bool,
        classified: bool,
        relevant: bool,
        classification_results: Vec<ClassificationResult>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            url: url.to_string(),
            section: section.to_string(),
            extracted,
            classified,
            relevant,
            stored: false,
            article_id: None,
            classification_count: 0,
            classification_results,
            error: Some(error.into()),
        }
    }

    /// Result for an article that classified below the relevance
    /// threshold. Not an error.
    pub fn not_relevant(
        url: &str,
        section: &str,
        classification_results: Vec<ClassificationResult>,
    ) -> Self {
        Self {
            url: url.to_string(),
            section: section.to_string(),
            extracted: true,
            classified: true,
            relevant: false,
            stored: false,
            article_id: None,
            classification_count: 0,
            classification_results,
            error: None,
        }
    }

    /// Whether this result is the duplicate-URL outcome.
    pub fn is_duplicate(&self) -> bool {
        self.extracted && self.classified && self.relevant && !self.stored && self.error.is_none()
    }
}

/// Error category of a result, used by batch statistics and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    None,
    Extraction,
    Classification,
    Storage,
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Extraction => "extraction",
            Self::Classification => "classification",
            Self::Storage => "storage",
            Self::Other => "other",
        }
    }
}

/// Categorize an orchestration result for error accounting.
pub fn classify_error(result: &OrchestrationResult) -> ErrorCategory {
    if result.error.is_none() {
        return ErrorCategory::None;
    }
    if !result.extracted {
        return ErrorCategory::Extraction;
    }
    if !result.classified {
        return ErrorCategory::Classification;
    }
    if result.relevant && !result.stored {
        return ErrorCategory::Storage;
    }
    ErrorCategory::Other
}
