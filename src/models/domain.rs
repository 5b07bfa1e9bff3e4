//! Persistent domain models mapping to the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::models::classification::{ClassificationResult, NormalizedEntity};
use crate::models::discovery::validate_url_shape;
use crate::models::extraction::ExtractedArticleContent;

/// A fetched, parsed news item stored in the corpus.
///
/// Maps to the `articles` table. `id` is the internal surrogate key;
/// `public_id` is the external-facing UUID. Created once, never updated by
/// the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: Option<i64>,
    pub public_id: Uuid,
    pub url: String,
    pub title: String,
    pub section: String,
    pub published_date: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
    pub full_text: Option<String>,
    pub news_source_id: i32,
}

impl Article {
    /// Convert extracted content plus discovery context into an insertable
    /// article row.
    pub fn from_extracted(
        extracted: &ExtractedArticleContent,
        url: &str,
        section: &str,
        news_source_id: i32,
    ) -> Result<Self> {
        let url = url.trim().to_string();
        validate_url_shape(&url)?;

        let section = section.trim().to_string();
        if section.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Section cannot be empty".to_string(),
            ));
        }
        if news_source_id <= 0 {
            return Err(PipelineError::InvalidInput(format!(
                "News source ID must be positive, got: {news_source_id}"
            )));
        }

        Ok(Self {
            id: None,
            public_id: Uuid::new_v4(),
            url,
            title: extracted.title.clone(),
            section,
            published_date: extracted.published_date,
            fetched_at: Utc::now(),
            full_text: Some(extracted.full_text.clone()),
            news_source_id,
        })
    }
}

/// The persisted verdict of one classifier on one article.
///
/// Maps to the `classifications` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Classification {
    pub id: Option<i64>,
    pub article_id: i64,
    pub classifier_type: String,
    pub confidence_score: f64,
    pub reasoning: Option<String>,
    pub classified_at: DateTime<Utc>,
    pub model_name: String,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
}

impl Classification {
    /// Convert a classifier verdict into an insertable row. Only valid
    /// after the article has been stored.
    pub fn from_result(result: &ClassificationResult, article_id: i64) -> Result<Self> {
        if !(0.0..=1.0).contains(&result.confidence) {
            return Err(PipelineError::InvalidInput(format!(
                "Confidence score must be between 0.0 and 1.0, got: {}",
                result.confidence
            )));
        }

        Ok(Self {
            id: None,
            article_id,
            classifier_type: result.classifier_type.as_str().to_string(),
            confidence_score: result.confidence,
            reasoning: Some(result.reasoning.clone()),
            classified_at: Utc::now(),
            model_name: result.model_name.clone(),
            is_verified: false,
            verified_at: None,
            verified_by: None,
        })
    }
}

/// A canonical named entity mentioned in classified articles.
///
/// Maps to the `entities` table. `name` is the display form (the original
/// spelling first seen), `normalized_name` the canonical deduplication key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entity {
    pub id: Option<i64>,
    pub name: String,
    pub normalized_name: String,
    pub created_at: DateTime<Utc>,
}

impl Entity {
    pub fn from_normalized(normalized: &NormalizedEntity) -> Self {
        Self {
            id: None,
            name: normalized.original_value.clone(),
            normalized_name: normalized.normalized_value.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Junction row linking an article to an entity.
///
/// Maps to the `article_entities` table. `(article_id, entity_id)` is
/// unique. `classifier_type` records which classifier surfaced the link;
/// the current pipeline writes a single fixed type for all links (see the
/// schema comment on the table).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArticleEntity {
    pub id: Option<i64>,
    pub article_id: i64,
    pub entity_id: i64,
    pub classifier_type: String,
    pub created_at: DateTime<Utc>,
}

/// A news source articles are discovered from.
///
/// Maps to the `news_sources` table. Updated by the pipeline only through
/// `update_last_scraped_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NewsSource {
    pub id: Option<i32>,
    pub name: String,
    pub base_url: String,
    pub crawl_delay_seconds: i32,
    pub is_active: bool,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl NewsSource {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        let base_url = base_url.into().trim().to_string();
        if name.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Name cannot be empty".to_string(),
            ));
        }
        if base_url.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Base URL cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: None,
            name,
            base_url,
            crawl_delay_seconds: 10,
            is_active: true,
            last_scraped_at: None,
            created_at: Utc::now(),
        })
    }
}

/// Outcome of storing an article with its classifications and entities.
///
/// `stored == false` with no error means the article URL already existed
/// (a normal, observable "duplicate" outcome at the orchestration layer).
#[derive(Debug, Clone, Default)]
pub struct ArticleStorageResult {
    pub stored: bool,
    pub article_id: Option<i64>,
    pub classification_count: usize,
    pub article: Option<Article>,
    pub classifications: Vec<Classification>,
    pub entities: Vec<Entity>,
}

impl ArticleStorageResult {
    /// The result reported when the article URL already exists.
    pub fn duplicate() -> Self {
        Self::default()
    }
}
