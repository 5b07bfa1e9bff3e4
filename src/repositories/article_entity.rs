//! Article-entity junction repository.

use sqlx::PgConnection;

use crate::error::Result;
use crate::models::ArticleEntity;

#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleEntityRepository;

impl ArticleEntityRepository {
    pub fn new() -> Self {
        Self
    }

    /// Link an article to an entity.
    ///
    /// A unique violation on `(article_id, entity_id)` propagates; the
    /// persistence service swallows it (the link already exists).
    pub async fn link(
        &self,
        conn: &mut PgConnection,
        article_entity: &ArticleEntity,
    ) -> Result<ArticleEntity> {
        let linked = sqlx::query_as::<_, ArticleEntity>(
            r#"
            INSERT INTO article_entities (article_id, entity_id, classifier_type, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, article_id, entity_id, classifier_type, created_at
            "#,
        )
        .bind(article_entity.article_id)
        .bind(article_entity.entity_id)
        .bind(&article_entity.classifier_type)
        .bind(article_entity.created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(linked)
    }
}
