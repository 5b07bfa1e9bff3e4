//! Article repository.

use std::collections::HashSet;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Article;

#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleRepository;

impl ArticleRepository {
    pub fn new() -> Self {
        Self
    }

    /// Insert a new article and return it with its database-generated id.
    ///
    /// A unique violation on `url` propagates as a database error; the
    /// persistence service converts it into the duplicate outcome.
    pub async fn insert(&self, conn: &mut PgConnection, article: &Article) -> Result<Article> {
        let inserted = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (
                public_id, url, title, section, published_date,
                fetched_at, full_text, news_source_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, public_id, url, title, section, published_date,
                      fetched_at, full_text, news_source_id
            "#,
        )
        .bind(article.public_id)
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.section)
        .bind(article.published_date)
        .bind(article.fetched_at)
        .bind(&article.full_text)
        .bind(article.news_source_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(inserted)
    }

    /// Which of the given URLs already exist, resolved in one batch query.
    pub async fn get_existing_urls(
        &self,
        conn: &mut PgConnection,
        urls: &[String],
    ) -> Result<HashSet<String>> {
        if urls.is_empty() {
            return Ok(HashSet::new());
        }

        let existing: Vec<String> =
            sqlx::query_scalar("SELECT url FROM articles WHERE url = ANY($1)")
                .bind(urls)
                .fetch_all(&mut *conn)
                .await?;

        Ok(existing.into_iter().collect())
    }

    /// Look an article up by its external UUID.
    pub async fn get_by_public_id(
        &self,
        conn: &mut PgConnection,
        public_id: Uuid,
    ) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, public_id, url, title, section, published_date,
                   fetched_at, full_text, news_source_id
            FROM articles
            WHERE public_id = $1
            "#,
        )
        .bind(public_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(article)
    }
}
