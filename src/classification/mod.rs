//! Article classification.
//!
//! A [`Classifier`] judges one article for one accountability topic. The
//! [`ClassificationService`] fans an article out over every configured
//! classifier in parallel and gathers the verdicts.

pub mod llm_classifier;
pub mod normalizer;
pub mod prompts;
pub mod service;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ClassificationInput, ClassificationResult};

pub use llm_classifier::LlmClassifier;
pub use normalizer::EntityNormalizerService;
pub use service::ClassificationService;

/// An LLM-backed judge producing a relevance verdict on one article.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Identity used in logs when this classifier fails.
    fn name(&self) -> &str;

    async fn classify(&self, article: &ClassificationInput) -> Result<ClassificationResult>;
}
