//! Classification repository.

use sqlx::PgConnection;

use crate::error::Result;
use crate::models::Classification;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationRepository;

impl ClassificationRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        classification: &Classification,
    ) -> Result<Classification> {
        let inserted = sqlx::query_as::<_, Classification>(
            r#"
            INSERT INTO classifications (
                article_id, classifier_type, confidence_score, reasoning,
                classified_at, model_name, is_verified, verified_at, verified_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, article_id, classifier_type, confidence_score, reasoning,
                      classified_at, model_name, is_verified, verified_at, verified_by
            "#,
        )
        .bind(classification.article_id)
        .bind(&classification.classifier_type)
        .bind(classification.confidence_score)
        .bind(&classification.reasoning)
        .bind(classification.classified_at)
        .bind(&classification.model_name)
        .bind(classification.is_verified)
        .bind(classification.verified_at)
        .bind(&classification.verified_by)
        .fetch_one(&mut *conn)
        .await?;

        Ok(inserted)
    }
}
