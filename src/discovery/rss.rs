//! RSS feed discovery.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::discovery::{deduplicate_discovered_articles, ArticleDiscoverer};
use crate::error::{PipelineError, Result};
use crate::fetch::HttpFetcher;
use crate::models::{DiscoveredArticle, RssFeedConfig};

/// Discovers articles from a set of RSS feeds, one section per feed.
///
/// Feeds are independent: a feed whose fetch exhausts retries or whose
/// body fails to parse is skipped fail-soft and contributes zero items.
pub struct RssFeedDiscoverer {
    fetcher: HttpFetcher,
    feeds: Vec<RssFeedConfig>,
}

impl RssFeedDiscoverer {
    pub fn new(fetcher: HttpFetcher, feeds: Vec<RssFeedConfig>) -> Self {
        info!(feeds = feeds.len(), "Initialized RSS feed discoverer");
        Self { fetcher, feeds }
    }

    /// The production Gleaner feed set.
    pub fn gleaner() -> Self {
        Self::new(
            HttpFetcher::new(),
            vec![RssFeedConfig::new(
                "https://jamaica-gleaner.com/feed/rss.xml",
                "lead-stories",
            )],
        )
    }

    async fn discover_feed(
        &self,
        feed: &RssFeedConfig,
        news_source_id: i32,
    ) -> Result<Vec<DiscoveredArticle>> {
        let body = self.fetcher.fetch(&feed.url).await?;

        let parsed = feed_rs::parser::parse(body.as_bytes())
            .map_err(|e| PipelineError::Parse(format!("Invalid RSS feed format: {e}")))?;

        info!(
            feed = %feed.url,
            entries = parsed.entries.len(),
            "RSS feed parsed"
        );

        let mut articles = Vec::new();
        for (i, entry) in parsed.entries.iter().enumerate() {
            let Some(link) = entry.links.first().map(|l| l.href.clone()) else {
                warn!(
                    feed = %feed.url,
                    entry = i + 1,
                    total = parsed.entries.len(),
                    "Skipping RSS entry without a link"
                );
                continue;
            };

            let title = entry.title.as_ref().map(|t| t.content.clone());

            match DiscoveredArticle::new(
                link,
                news_source_id,
                feed.section.clone(),
                Utc::now(),
                title,
                entry.published,
            ) {
                Ok(article) => articles.push(article),
                Err(err) => {
                    warn!(
                        feed = %feed.url,
                        entry = i + 1,
                        error = %err,
                        "Skipping malformed RSS entry"
                    );
                }
            }
        }

        Ok(articles)
    }
}

#[async_trait]
impl ArticleDiscoverer for RssFeedDiscoverer {
    async fn discover(&self, news_source_id: i32) -> Result<Vec<DiscoveredArticle>> {
        if news_source_id <= 0 {
            return Err(PipelineError::InvalidInput(format!(
                "Invalid news_source_id: {news_source_id}"
            )));
        }

        info!(
            news_source_id,
            feeds = self.feeds.len(),
            "Starting RSS discovery"
        );

        let mut all_articles = Vec::new();
        for feed in &self.feeds {
            match self.discover_feed(feed, news_source_id).await {
                Ok(articles) => all_articles.extend(articles),
                Err(err) => {
                    warn!(feed = %feed.url, error = %err, "Failed to fetch feed, skipping");
                }
            }
        }

        let deduplicated = deduplicate_discovered_articles(all_articles);
        info!(
            unique = deduplicated.len(),
            "RSS discovery complete"
        );

        Ok(deduplicated)
    }
}
