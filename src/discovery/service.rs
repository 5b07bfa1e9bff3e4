//! Discovery service facade.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgConnection;
use tracing::{debug, info};

use crate::discovery::ArticleDiscoverer;
use crate::error::Result;
use crate::models::DiscoveredArticle;
use crate::repositories::NewsSourceRepository;

/// Thin facade over one discoverer.
///
/// Delegates discovery and, on success, stamps `last_scraped_at` on the
/// news source. Multi-strategy discovery is a matter of running several
/// services and merging with
/// [`deduplicate_discovered_articles`](crate::discovery::deduplicate_discovered_articles).
pub struct DiscoveryService {
    discoverer: Arc<dyn ArticleDiscoverer>,
    news_source_repo: NewsSourceRepository,
}

impl DiscoveryService {
    pub fn new(discoverer: Arc<dyn ArticleDiscoverer>, news_source_repo: NewsSourceRepository) -> Self {
        Self {
            discoverer,
            news_source_repo,
        }
    }

    /// Discover articles from a news source. The caller manages the
    /// connection lifecycle.
    pub async fn discover(
        &self,
        conn: &mut PgConnection,
        news_source_id: i32,
    ) -> Result<Vec<DiscoveredArticle>> {
        let articles = self.discoverer.discover(news_source_id).await?;

        info!(
            news_source_id,
            articles = articles.len(),
            "Discovery complete"
        );

        let updated = self
            .news_source_repo
            .update_last_scraped_at(conn, news_source_id, Utc::now())
            .await?;
        debug!(
            source = %updated.name,
            last_scraped_at = ?updated.last_scraped_at,
            "Updated last_scraped_at"
        );

        Ok(articles)
    }
}
