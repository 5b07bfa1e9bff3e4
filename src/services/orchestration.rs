//! Per-URL orchestration pipeline.
//!
//! Runs extract -> classify -> filter -> normalize -> store for one
//! article and emits exactly one canonical log record per call with
//! complete per-stage telemetry. The caller supplies the database
//! connection; storage runs in its own transaction on that connection.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sqlx::PgConnection;
use tracing::{error, info, warn};

use crate::classification::{ClassificationService, EntityNormalizerService};
use crate::error::{PipelineError, Result};
use crate::extraction::ArticleExtraction;
use crate::models::classification::filter_relevant_classifications;
use crate::models::{
    ArticleStorageResult, ClassificationInput, ClassificationResult, ExtractedArticleContent,
    NormalizedEntity, OrchestrationResult,
};
use crate::services::PersistenceService;

/// Storage seam, split out so tests can substitute persistence.
#[async_trait]
pub trait ArticlePersistence: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn store_article_with_classifications(
        &self,
        conn: &mut PgConnection,
        extracted: &ExtractedArticleContent,
        url: &str,
        section: &str,
        relevant_classifications: &[ClassificationResult],
        normalized_entities: &[NormalizedEntity],
        news_source_id: i32,
    ) -> Result<ArticleStorageResult>;
}

#[async_trait]
impl ArticlePersistence for PersistenceService {
    async fn store_article_with_classifications(
        &self,
        conn: &mut PgConnection,
        extracted: &ExtractedArticleContent,
        url: &str,
        section: &str,
        relevant_classifications: &[ClassificationResult],
        normalized_entities: &[NormalizedEntity],
        news_source_id: i32,
    ) -> Result<ArticleStorageResult> {
        PersistenceService::store_article_with_classifications(
            self,
            conn,
            extracted,
            url,
            section,
            relevant_classifications,
            normalized_entities,
            news_source_id,
        )
        .await
    }
}

pub struct OrchestrationService {
    extraction: Arc<dyn ArticleExtraction>,
    classification: ClassificationService,
    persistence: Arc<dyn ArticlePersistence>,
    normalizer: Arc<EntityNormalizerService>,
}

impl OrchestrationService {
    /// Production wiring: Gleaner extraction, both LLM classifiers, the
    /// Postgres persistence service and the singleton-cached normalizer.
    pub fn production(config: &crate::config::AppConfig) -> Self {
        use crate::cache::entity_cache;
        use crate::classification::LlmClassifier;
        use crate::extraction::ExtractionService;

        let classifiers: Vec<Arc<dyn crate::classification::Classifier>> = vec![
            Arc::new(LlmClassifier::corruption(&config.llm)),
            Arc::new(LlmClassifier::hurricane_relief(&config.llm)),
        ];

        Self::new(
            Arc::new(ExtractionService::new()),
            ClassificationService::new(classifiers),
            Arc::new(PersistenceService::new()),
            Arc::new(EntityNormalizerService::new(
                &config.llm,
                Some(entity_cache(config.entity_cache)),
            )),
        )
    }

    pub fn new(
        extraction: Arc<dyn ArticleExtraction>,
        classification: ClassificationService,
        persistence: Arc<dyn ArticlePersistence>,
        normalizer: Arc<EntityNormalizerService>,
    ) -> Self {
        Self {
            extraction,
            classification,
            persistence,
            normalizer,
        }
    }

    /// Process one article through the full pipeline.
    ///
    /// Stage failures are captured into the result, never raised; the
    /// caller distinguishes outcomes via the result's flags and `error`.
    pub async fn process_article(
        &self,
        conn: &mut PgConnection,
        url: &str,
        section: &str,
        news_source_id: i32,
        min_confidence: f64,
    ) -> OrchestrationResult {
        let mut telemetry = Telemetry::new(url, section, news_source_id, min_confidence);
        let pipeline_start = Instant::now();

        // Stage 1: extract.
        let extraction_start = Instant::now();
        let extracted = self.extraction.extract_article_content(url).await;
        telemetry.duration("extraction_duration_ms", extraction_start);

        let extracted = match extracted {
            Ok(content) => content,
            Err(err) => {
                let result = OrchestrationResult::failure(
                    url,
                    section,
                    false,
                    false,
                    false,
                    vec![],
                    format!("Failed to extract article: {err}"),
                );
                telemetry.record_failure(&result, "extraction", err.kind());
                telemetry.emit(pipeline_start, CanonicalLevel::Error);
                return result;
            }
        };

        telemetry.set("extracted", json!(true));
        telemetry.set("extracted_title", json!(truncate(&extracted.title, 100)));

        // Stage 2: convert to classification input.
        let input = match ClassificationInput::from_extracted(&extracted, url, section) {
            Ok(input) => input,
            Err(err) => {
                let result = OrchestrationResult::failure(
                    url,
                    section,
                    true,
                    false,
                    false,
                    vec![],
                    format!("Failed to convert to classification input: {err}"),
                );
                telemetry.record_failure(&result, "conversion", err.kind());
                telemetry.emit(pipeline_start, CanonicalLevel::Error);
                return result;
            }
        };

        // Stage 3: classify (fan-out over all classifiers).
        let classification_start = Instant::now();
        let classification_results = self.classification.classify(&input).await;
        telemetry.duration("classification_duration_ms", classification_start);

        let classification_results = match classification_results {
            Ok(results) => results,
            Err(err) => {
                let result = OrchestrationResult::failure(
                    url,
                    section,
                    true,
                    false,
                    false,
                    vec![],
                    format!("Failed to classify article: {err}"),
                );
                telemetry.record_failure(&result, "classification", err.kind());
                telemetry.emit(pipeline_start, CanonicalLevel::Error);
                return result;
            }
        };

        telemetry.set("classified", json!(true));
        telemetry.set("classifier_count", json!(classification_results.len()));
        for result in &classification_results {
            let prefix = result.classifier_type.telemetry_prefix();
            telemetry.set(&format!("{prefix}_relevant"), json!(result.is_relevant));
            telemetry.set(&format!("{prefix}_confidence"), json!(result.confidence));
            telemetry.set(&format!("{prefix}_model"), json!(result.model_name));
        }

        // Stage 4: filter by relevance threshold.
        let relevant_results =
            filter_relevant_classifications(&classification_results, min_confidence);

        if relevant_results.is_empty() {
            telemetry.set("relevant", json!(false));
            telemetry.set("stored", json!(false));
            telemetry.set("relevant_classifiers", json!(0));
            let result = OrchestrationResult::not_relevant(url, section, classification_results);
            telemetry.emit(pipeline_start, CanonicalLevel::Info);
            return result;
        }

        telemetry.set("relevant", json!(true));
        telemetry.set("relevant_classifiers", json!(relevant_results.len()));

        // Stage 5: normalize entities. Failures here never block storage.
        let normalization_start = Instant::now();
        let normalized_entities = self
            .normalize_entities(&relevant_results, url, section, &mut telemetry)
            .await;
        telemetry.duration("entity_normalization_duration_ms", normalization_start);
        telemetry.set("entity_count", json!(normalized_entities.len()));

        // Stage 6: store.
        let storage_start = Instant::now();
        let storage_outcome = self
            .persistence
            .store_article_with_classifications(
                conn,
                &extracted,
                url,
                section,
                &relevant_results,
                &normalized_entities,
                news_source_id,
            )
            .await;
        telemetry.duration("storage_duration_ms", storage_start);

        match storage_outcome {
            Ok(storage) => {
                telemetry.set("stored", json!(storage.stored));
                telemetry.set("article_id", json!(storage.article_id));
                telemetry.set("classification_count", json!(storage.classification_count));

                if storage.stored {
                    let result = OrchestrationResult {
                        url: url.to_string(),
                        section: section.to_string(),
                        extracted: true,
                        classified: true,
                        relevant: true,
                        stored: true,
                        article_id: storage.article_id,
                        classification_count: storage.classification_count,
                        classification_results,
                        error: None,
                    };
                    telemetry.emit(pipeline_start, CanonicalLevel::Info);
                    result
                } else {
                    // Duplicate URL: a normal outcome, logged at warn.
                    let result = OrchestrationResult {
                        url: url.to_string(),
                        section: section.to_string(),
                        extracted: true,
                        classified: true,
                        relevant: true,
                        stored: false,
                        article_id: None,
                        classification_count: 0,
                        classification_results,
                        error: None,
                    };
                    telemetry.emit(pipeline_start, CanonicalLevel::Warn);
                    result
                }
            }
            Err(err) => {
                let result = OrchestrationResult::failure(
                    url,
                    section,
                    true,
                    true,
                    true,
                    classification_results,
                    format!("Failed to store article: {err}"),
                );
                telemetry.record_failure(&result, "storage", err.kind());
                telemetry.emit(pipeline_start, CanonicalLevel::Error);
                result
            }
        }
    }

    /// Union of key entities across relevant classifications, normalized.
    /// Any failure is logged and downgraded to zero entities.
    async fn normalize_entities(
        &self,
        relevant_results: &[ClassificationResult],
        url: &str,
        section: &str,
        telemetry: &mut Telemetry,
    ) -> Vec<NormalizedEntity> {
        let mut seen = HashSet::new();
        let unique_entities: Vec<String> = relevant_results
            .iter()
            .flat_map(|r| r.key_entities.iter())
            .filter(|e| seen.insert(e.as_str().to_string()))
            .cloned()
            .collect();

        if unique_entities.is_empty() {
            return Vec::new();
        }

        match self.normalizer.normalize(&unique_entities).await {
            Ok(normalized) => normalized,
            Err(err) => {
                warn!(
                    url,
                    section,
                    error_type = err.kind(),
                    error = %err,
                    "Entity normalization failed - continuing without entities"
                );
                telemetry.set("entity_normalization_error", json!(err.to_string()));
                Vec::new()
            }
        }
    }
}

enum CanonicalLevel {
    Info,
    Warn,
    Error,
}

/// Flat telemetry map backing the canonical log line.
struct Telemetry {
    fields: Map<String, Value>,
}

impl Telemetry {
    fn new(url: &str, section: &str, news_source_id: i32, min_confidence: f64) -> Self {
        let mut fields = Map::new();
        fields.insert("url".to_string(), json!(url));
        fields.insert("section".to_string(), json!(section));
        fields.insert("news_source_id".to_string(), json!(news_source_id));
        fields.insert("min_confidence".to_string(), json!(min_confidence));
        Self { fields }
    }

    fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    fn duration(&mut self, key: &str, start: Instant) {
        let ms = start.elapsed().as_secs_f64() * 1000.0;
        self.set(key, json!((ms * 100.0).round() / 100.0));
    }

    fn record_failure(&mut self, result: &OrchestrationResult, stage: &str, error_type: &str) {
        self.set("extracted", json!(result.extracted));
        self.set("classified", json!(result.classified));
        self.set("relevant", json!(result.relevant));
        self.set("stored", json!(false));
        if let Some(error) = &result.error {
            self.set("error", json!(error));
        }
        self.set("error_stage", json!(stage));
        self.set("error_type", json!(error_type));
    }

    /// Emit the single canonical record for this pipeline invocation.
    fn emit(mut self, pipeline_start: Instant, level: CanonicalLevel) {
        self.duration("total_duration_ms", pipeline_start);
        let telemetry =
            serde_json::to_string(&Value::Object(self.fields)).unwrap_or_default();

        match level {
            CanonicalLevel::Info => info!(target: "canonical", %telemetry, "canonical-log-line"),
            CanonicalLevel::Warn => warn!(target: "canonical", %telemetry, "canonical-log-line"),
            CanonicalLevel::Error => error!(target: "canonical", %telemetry, "canonical-log-line"),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Convert an error escaping the task boundary into an "other" error
/// result, keeping the worker pool fail-soft.
pub fn unexpected_error_result(
    url: &str,
    section: &str,
    err: &PipelineError,
) -> OrchestrationResult {
    OrchestrationResult::failure(
        url,
        section,
        false,
        false,
        false,
        vec![],
        format!("Unexpected error: {err}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_limits_chars() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 5), "ab");
    }

    #[test]
    fn telemetry_records_failure_fields() {
        let mut telemetry = Telemetry::new("https://example.com/a", "news", 1, 0.7);
        let result = OrchestrationResult::failure(
            "https://example.com/a",
            "news",
            false,
            false,
            false,
            vec![],
            "Failed to extract article: 404",
        );
        telemetry.record_failure(&result, "extraction", "FetchTerminal");

        assert_eq!(telemetry.fields["error_stage"], json!("extraction"));
        assert_eq!(telemetry.fields["error_type"], json!("FetchTerminal"));
        assert_eq!(telemetry.fields["extracted"], json!(false));
    }

    #[test]
    fn unexpected_error_result_carries_the_failure() {
        let err = PipelineError::Cache("mutex poisoned".to_string());
        let result = unexpected_error_result("https://example.com/a", "news", &err);
        assert!(!result.extracted);
        assert!(!result.stored);
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .starts_with("Unexpected error:"));
    }
}
