//! Transactional article persistence.
//!
//! Stores an article together with its classifications, entities and
//! article-entity links in one transaction on the caller's connection.
//! The caller owns the connection; this service owns the transaction
//! boundary. That split is what lets the batch driver check a connection
//! out per task and still get atomic storage per article.

use chrono::Utc;
use sqlx::{Connection, PgConnection};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::models::{
    Article, ArticleEntity, ArticleStorageResult, Classification, Entity,
    ClassificationResult, ExtractedArticleContent, NormalizedEntity,
};
use crate::repositories::{
    ArticleEntityRepository, ArticleRepository, ClassificationRepository, EntityRepository,
};

/// Classifier type recorded on article-entity links. Entities from every
/// classifier are normalized together, so per-entity provenance is not
/// available at link time; see the note on the `article_entities` table.
const LINK_CLASSIFIER_TYPE: &str = "CORRUPTION";

pub struct PersistenceService {
    article_repo: ArticleRepository,
    classification_repo: ClassificationRepository,
    entity_repo: EntityRepository,
    article_entity_repo: ArticleEntityRepository,
}

impl PersistenceService {
    pub fn new() -> Self {
        Self {
            article_repo: ArticleRepository::new(),
            classification_repo: ClassificationRepository::new(),
            entity_repo: EntityRepository::new(),
            article_entity_repo: ArticleEntityRepository::new(),
        }
    }

    /// Store an article with its classifications and entities atomically.
    ///
    /// `relevant_classifications` must be non-empty: relevance is decided
    /// before storage, and the corpus never holds an article without at
    /// least one classification. A unique violation on the article URL
    /// rolls the transaction back and reports the duplicate outcome; any
    /// other failure propagates after rollback, leaving zero rows behind.
    #[allow(clippy::too_many_arguments)]
    pub async fn store_article_with_classifications(
        &self,
        conn: &mut PgConnection,
        extracted: &ExtractedArticleContent,
        url: &str,
        section: &str,
        relevant_classifications: &[ClassificationResult],
        normalized_entities: &[NormalizedEntity],
        news_source_id: i32,
    ) -> Result<ArticleStorageResult> {
        if relevant_classifications.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Cannot store article without classifications. At least one relevant \
                 classification is required; relevance is determined before calling this method."
                    .to_string(),
            ));
        }

        let article = Article::from_extracted(extracted, url, section, news_source_id)?;

        let mut tx = conn.begin().await?;

        let stored_article = match self.article_repo.insert(&mut *tx, &article).await {
            Ok(stored) => stored,
            Err(err) if is_unique_violation(&err) => {
                tx.rollback().await?;
                info!(url, "Article already exists, skipping");
                return Ok(ArticleStorageResult::duplicate());
            }
            Err(err) => return Err(err),
        };

        let article_id = stored_article
            .id
            .expect("inserted article always has an id");
        info!(article_id, url, "Article stored");

        let classifications = self
            .store_classifications(&mut *tx, article_id, relevant_classifications)
            .await?;

        let entities = self
            .store_entities(&mut *tx, article_id, normalized_entities)
            .await?;

        tx.commit().await?;

        Ok(ArticleStorageResult {
            stored: true,
            article_id: Some(article_id),
            classification_count: classifications.len(),
            article: Some(stored_article),
            classifications,
            entities,
        })
    }

    async fn store_classifications(
        &self,
        conn: &mut PgConnection,
        article_id: i64,
        results: &[ClassificationResult],
    ) -> Result<Vec<Classification>> {
        let mut stored = Vec::with_capacity(results.len());
        for result in results {
            let classification = Classification::from_result(result, article_id)?;
            let inserted = self.classification_repo.insert(conn, &classification).await?;
            info!(
                classifier_type = %result.classifier_type,
                confidence = result.confidence,
                "Classification stored"
            );
            stored.push(inserted);
        }
        Ok(stored)
    }

    /// Find-or-create each unique entity, then link it to the article.
    /// Duplicate-link unique violations are swallowed.
    async fn store_entities(
        &self,
        conn: &mut PgConnection,
        article_id: i64,
        normalized_entities: &[NormalizedEntity],
    ) -> Result<Vec<Entity>> {
        if normalized_entities.is_empty() {
            debug!("No entities to store");
            return Ok(Vec::new());
        }

        let unique = dedupe_by_normalized_value(normalized_entities);
        info!(
            raw = normalized_entities.len(),
            unique = unique.len(),
            "Deduplicated entities"
        );

        let mut stored = Vec::with_capacity(unique.len());
        let mut links_created = 0usize;

        for norm_entity in unique {
            let entity = match self
                .entity_repo
                .find_by_normalized_name(conn, &norm_entity.normalized_value)
                .await?
            {
                Some(existing) => {
                    debug!(
                        normalized_name = %norm_entity.normalized_value,
                        entity_id = ?existing.id,
                        "Entity already exists"
                    );
                    existing
                }
                None => {
                    let created = self
                        .entity_repo
                        .insert(conn, &Entity::from_normalized(norm_entity))
                        .await?;
                    info!(
                        name = %norm_entity.original_value,
                        normalized_name = %norm_entity.normalized_value,
                        entity_id = ?created.id,
                        "Created new entity"
                    );
                    created
                }
            };

            let entity_id = entity.id.expect("persisted entity always has an id");

            let link = ArticleEntity {
                id: None,
                article_id,
                entity_id,
                classifier_type: LINK_CLASSIFIER_TYPE.to_string(),
                created_at: Utc::now(),
            };

            match self.article_entity_repo.link(conn, &link).await {
                Ok(_) => links_created += 1,
                Err(err) if is_unique_violation(&err) => {
                    debug!(article_id, entity_id, "Link already exists");
                }
                Err(err) => return Err(err),
            }

            stored.push(entity);
        }

        info!(
            entities = stored.len(),
            links_created, "Entity storage complete"
        );

        Ok(stored)
    }
}

impl Default for PersistenceService {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep the first occurrence of each `normalized_value`.
fn dedupe_by_normalized_value(entities: &[NormalizedEntity]) -> Vec<&NormalizedEntity> {
    let mut seen = std::collections::HashSet::new();
    entities
        .iter()
        .filter(|e| seen.insert(e.normalized_value.as_str()))
        .collect()
}

fn is_unique_violation(err: &PipelineError) -> bool {
    matches!(
        err,
        PipelineError::Storage(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}
