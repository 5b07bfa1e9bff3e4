//! Entity repository.

use sqlx::PgConnection;

use crate::error::Result;
use crate::models::Entity;

#[derive(Debug, Clone, Copy, Default)]
pub struct EntityRepository;

impl EntityRepository {
    pub fn new() -> Self {
        Self
    }

    /// Find an entity by its canonical name. Used for deduplication before
    /// insert.
    pub async fn find_by_normalized_name(
        &self,
        conn: &mut PgConnection,
        normalized_name: &str,
    ) -> Result<Option<Entity>> {
        let entity = sqlx::query_as::<_, Entity>(
            r#"
            SELECT id, name, normalized_name, created_at
            FROM entities
            WHERE normalized_name = $1
            "#,
        )
        .bind(normalized_name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(entity)
    }

    pub async fn insert(&self, conn: &mut PgConnection, entity: &Entity) -> Result<Entity> {
        let inserted = sqlx::query_as::<_, Entity>(
            r#"
            INSERT INTO entities (name, normalized_name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, normalized_name, created_at
            "#,
        )
        .bind(&entity.name)
        .bind(&entity.normalized_name)
        .bind(entity.created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(inserted)
    }

    pub async fn find_entities_by_article_id(
        &self,
        conn: &mut PgConnection,
        article_id: i64,
    ) -> Result<Vec<Entity>> {
        let entities = sqlx::query_as::<_, Entity>(
            r#"
            SELECT e.id, e.name, e.normalized_name, e.created_at
            FROM entities e
            JOIN article_entities ae ON ae.entity_id = e.id
            WHERE ae.article_id = $1
            ORDER BY e.normalized_name
            "#,
        )
        .bind(article_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(entities)
    }

    pub async fn find_article_ids_by_entity_id(
        &self,
        conn: &mut PgConnection,
        entity_id: i64,
    ) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT article_id FROM article_entities WHERE entity_id = $1 ORDER BY article_id",
        )
        .bind(entity_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(ids)
    }
}
