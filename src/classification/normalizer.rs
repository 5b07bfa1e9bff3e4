//! Entity normalization backed by the cache and a normalization agent.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::EntityCache;
use crate::classification::prompts::NORMALIZATION_INSTRUCTION;
use crate::config::LlmSettings;
use crate::error::{PipelineError, Result};
use crate::llm::{extract_json_object, LlmClient};
use crate::models::{EntityNormalizationResult, NormalizedEntity};

/// Batch-normalizes raw entity strings to canonical forms.
///
/// The cache front-ends the LLM: hits skip the model entirely, and a
/// single batch prompt covers every miss. Cache failures never fail the
/// pipeline; they degrade to uncached operation with a warning.
pub struct EntityNormalizerService {
    client: LlmClient,
    cache: Option<Arc<dyn EntityCache>>,
}

impl EntityNormalizerService {
    pub fn new(settings: &LlmSettings, cache: Option<Arc<dyn EntityCache>>) -> Self {
        info!(
            cache_enabled = cache.is_some(),
            "Initialized entity normalizer"
        );
        Self {
            client: LlmClient::new(settings, settings.normalization_model.clone()),
            cache,
        }
    }

    /// Normalize a batch of entity names, preserving input order.
    pub async fn normalize(&self, entities: &[String]) -> Result<Vec<NormalizedEntity>> {
        if entities.is_empty() {
            return Err(PipelineError::InvalidInput(
                "entities list cannot be empty".to_string(),
            ));
        }

        let (mut resolved, uncached) = self.probe_cache(entities).await;

        if uncached.is_empty() {
            info!("All entities found in cache (no LLM call needed)");
            self.log_cache_stats().await;
            return collect_in_order(entities, &resolved);
        }

        info!(count = uncached.len(), "Normalizing entities via LLM");
        let normalized = self.normalize_via_agent(&uncached).await?;

        self.populate_cache(&normalized).await;

        for entity in normalized {
            resolved.insert(entity.original_value.clone(), entity);
        }

        self.log_cache_stats().await;
        collect_in_order(entities, &resolved)
    }

    /// Split input into cached hits and uncached misses. A cache failure
    /// degrades to "everything is a miss".
    async fn probe_cache(
        &self,
        entities: &[String],
    ) -> (HashMap<String, NormalizedEntity>, Vec<String>) {
        let Some(cache) = &self.cache else {
            return (HashMap::new(), entities.to_vec());
        };

        match cache.get_many(entities).await {
            Ok(cached) => {
                let uncached: Vec<String> = entities
                    .iter()
                    .filter(|e| !cached.contains_key(*e))
                    .cloned()
                    .collect();
                info!(
                    hits = cached.len(),
                    misses = uncached.len(),
                    "Cache lookup complete"
                );
                (cached, uncached)
            }
            Err(err) => {
                warn!(error = %err, "Cache lookup failed, falling back to LLM for all entities");
                (HashMap::new(), entities.to_vec())
            }
        }
    }

    async fn normalize_via_agent(&self, uncached: &[String]) -> Result<Vec<NormalizedEntity>> {
        let entity_list = uncached
            .iter()
            .map(|e| format!("\"{e}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!("Normalize these entities: {entity_list}");

        let response = self.client.chat(NORMALIZATION_INSTRUCTION, &prompt).await?;
        let json = extract_json_object(&response)
            .map_err(|e| PipelineError::Normalization(e.to_string()))?;

        let mut result: EntityNormalizationResult =
            serde_json::from_value(json).map_err(|e| {
                PipelineError::Normalization(format!("response did not match schema: {e}"))
            })?;
        result.model_name = self.client.model().to_string();

        for entity in &mut result.normalized_entities {
            entity
                .validate()
                .map_err(|e| PipelineError::Normalization(e.to_string()))?;
        }

        Ok(result.normalized_entities)
    }

    async fn populate_cache(&self, normalized: &[NormalizedEntity]) {
        let Some(cache) = &self.cache else {
            return;
        };
        if normalized.is_empty() {
            return;
        }

        let entries: HashMap<String, NormalizedEntity> = normalized
            .iter()
            .map(|e| (e.original_value.clone(), e.clone()))
            .collect();
        let count = entries.len();

        match cache.set_many(entries).await {
            Ok(()) => info!(count, "Cached newly normalized entities"),
            Err(err) => warn!(error = %err, "Cache population failed, continuing without caching"),
        }
    }

    async fn log_cache_stats(&self) {
        if let Some(cache) = &self.cache {
            let stats = cache.stats().await;
            debug!(
                hit_rate = format!("{:.1}%", stats.hit_rate * 100.0),
                size = stats.size,
                max_size = stats.max_size,
                hits = stats.hits,
                misses = stats.misses,
                evictions = stats.evictions,
                expirations = stats.expirations,
                "Cache stats"
            );
        }
    }
}

/// Re-order resolved entities to match the input list.
fn collect_in_order(
    entities: &[String],
    resolved: &HashMap<String, NormalizedEntity>,
) -> Result<Vec<NormalizedEntity>> {
    entities
        .iter()
        .map(|name| {
            resolved.get(name).cloned().ok_or_else(|| {
                PipelineError::Normalization(format!(
                    "normalization agent returned no result for entity '{name}'"
                ))
            })
        })
        .collect()
}
