//! Article discovery strategies.
//!
//! A discoverer enumerates candidate article URLs from an external
//! surface. Two strategies exist: the RSS feed set and the historical
//! archive date-range walker. The [`service::DiscoveryService`] facade
//! wraps one discoverer and records the crawl on the news source row.

pub mod archive;
pub mod rss;
pub mod service;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::DiscoveredArticle;

pub use archive::ArchiveDiscoverer;
pub use rss::RssFeedDiscoverer;
pub use service::DiscoveryService;

/// Strategy that enumerates candidate article URLs from a news source.
#[async_trait]
pub trait ArticleDiscoverer: Send + Sync {
    async fn discover(&self, news_source_id: i32) -> Result<Vec<DiscoveredArticle>>;
}

/// Deduplicate articles by URL, keeping the first occurrence.
///
/// Shared by the discoverers and by callers that merge results from
/// several discovery passes (e.g. parallel archive workers).
pub fn deduplicate_discovered_articles(articles: Vec<DiscoveredArticle>) -> Vec<DiscoveredArticle> {
    let mut seen = std::collections::HashSet::new();
    let total = articles.len();

    let deduplicated: Vec<DiscoveredArticle> = articles
        .into_iter()
        .filter(|article| {
            if seen.insert(article.url.clone()) {
                true
            } else {
                debug!(url = %article.url, "Duplicate URL found, skipping");
                false
            }
        })
        .collect();

    let removed = total - deduplicated.len();
    if removed > 0 {
        info!(
            unique = deduplicated.len(),
            duplicates_removed = removed,
            "Deduplication complete"
        );
    }

    deduplicated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lead(url: &str) -> DiscoveredArticle {
        DiscoveredArticle::new(url, 1, "news", Utc::now(), None, None).unwrap()
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let articles = vec![
            lead("https://example.com/a"),
            lead("https://example.com/b"),
            lead("https://example.com/a"),
        ];
        let unique = deduplicate_discovered_articles(articles);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].url, "https://example.com/a");
        assert_eq!(unique[1].url, "https://example.com/b");
    }

    #[test]
    fn dedup_of_empty_list_is_empty() {
        assert!(deduplicate_discovered_articles(vec![]).is_empty());
    }
}
