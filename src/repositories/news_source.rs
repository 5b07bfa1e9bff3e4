//! News source repository.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::error::{PipelineError, Result};
use crate::models::NewsSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct NewsSourceRepository;

impl NewsSourceRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        news_source: &NewsSource,
    ) -> Result<NewsSource> {
        let inserted = sqlx::query_as::<_, NewsSource>(
            r#"
            INSERT INTO news_sources (
                name, base_url, crawl_delay_seconds, is_active, last_scraped_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, base_url, crawl_delay_seconds, is_active,
                      last_scraped_at, created_at
            "#,
        )
        .bind(&news_source.name)
        .bind(&news_source.base_url)
        .bind(news_source.crawl_delay_seconds)
        .bind(news_source.is_active)
        .bind(news_source.last_scraped_at)
        .bind(news_source.created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(inserted)
    }

    /// Record a completed crawl on the source row.
    pub async fn update_last_scraped_at(
        &self,
        conn: &mut PgConnection,
        news_source_id: i32,
        last_scraped_at: DateTime<Utc>,
    ) -> Result<NewsSource> {
        let updated = sqlx::query_as::<_, NewsSource>(
            r#"
            UPDATE news_sources
            SET last_scraped_at = $2
            WHERE id = $1
            RETURNING id, name, base_url, crawl_delay_seconds, is_active,
                      last_scraped_at, created_at
            "#,
        )
        .bind(news_source_id)
        .bind(last_scraped_at)
        .fetch_optional(&mut *conn)
        .await?;

        updated.ok_or_else(|| {
            PipelineError::InvalidInput(format!("News source not found: {news_source_id}"))
        })
    }
}
