//! Discovery-layer models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Configuration for a single RSS feed.
///
/// RSS discoverers take a list of these, one per feed, where each feed
/// maps to a different section of the publication.
#[derive(Debug, Clone)]
pub struct RssFeedConfig {
    pub url: String,
    pub section: String,
}

impl RssFeedConfig {
    pub fn new(url: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            section: section.into(),
        }
    }
}

/// Article discovered from a news source.
///
/// The minimal lead passed from the discovery layer to the orchestrator.
/// Discovery identifies article URLs and basic metadata without fetching
/// full content; the URL is the unique identifier at this stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredArticle {
    pub url: String,
    pub news_source_id: i32,
    pub section: String,
    pub discovered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
}

impl DiscoveredArticle {
    /// Build a validated lead. Trims textual fields; empty optional title
    /// becomes `None`.
    pub fn new(
        url: impl Into<String>,
        news_source_id: i32,
        section: impl Into<String>,
        discovered_at: DateTime<Utc>,
        title: Option<String>,
        published_date: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let mut article = Self {
            url: url.into(),
            news_source_id,
            section: section.into(),
            discovered_at,
            title,
            published_date,
        };
        article.validate()?;
        Ok(article)
    }

    /// Normalize and check invariants in place. Used both by the
    /// constructor and after deserializing JSONL input.
    pub fn validate(&mut self) -> Result<()> {
        self.url = self.url.trim().to_string();
        validate_url_shape(&self.url)?;

        if self.news_source_id <= 0 {
            return Err(PipelineError::InvalidInput(format!(
                "News source ID must be positive, got: {}",
                self.news_source_id
            )));
        }

        self.section = self.section.trim().to_string();
        if self.section.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Section cannot be empty".to_string(),
            ));
        }

        self.title = self
            .title
            .take()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(())
    }
}

/// Shared URL-shape rule: non-empty, http(s) scheme.
pub(crate) fn validate_url_shape(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(PipelineError::InvalidInput(
            "URL cannot be empty".to_string(),
        ));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(PipelineError::InvalidInput(
            "URL must start with http:// or https://".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DiscoveredArticle {
        DiscoveredArticle::new(
            "https://jamaica-gleaner.com/article/news/20251201/example",
            1,
            "news",
            Utc::now(),
            Some("Example".to_string()),
            None,
        )
        .unwrap()
    }

    #[test]
    fn accepts_valid_article() {
        let article = valid();
        assert_eq!(article.section, "news");
        assert_eq!(article.title.as_deref(), Some("Example"));
    }

    #[test]
    fn rejects_empty_url() {
        let result = DiscoveredArticle::new("  ", 1, "news", Utc::now(), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_http_url() {
        let result = DiscoveredArticle::new("ftp://example.com", 1, "news", Utc::now(), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_positive_news_source_id() {
        let result = DiscoveredArticle::new(
            "https://example.com/a",
            0,
            "news",
            Utc::now(),
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn blank_title_becomes_none() {
        let article = DiscoveredArticle::new(
            "https://example.com/a",
            1,
            "news",
            Utc::now(),
            Some("   ".to_string()),
            None,
        )
        .unwrap();
        assert!(article.title.is_none());
    }

    #[test]
    fn jsonl_round_trip() {
        let article = valid();
        let line = serde_json::to_string(&article).unwrap();
        let mut parsed: DiscoveredArticle = serde_json::from_str(&line).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.url, article.url);
        assert_eq!(parsed.section, article.section);
        assert_eq!(parsed.title, article.title);
    }

    #[test]
    fn unknown_fields_ignored() {
        let line = r#"{"url":"https://example.com/a","news_source_id":1,"section":"news",
            "discovered_at":"2025-12-01T12:00:00+00:00","extra_field":"ignored"}"#;
        let parsed: DiscoveredArticle = serde_json::from_str(line).unwrap();
        assert_eq!(parsed.url, "https://example.com/a");
    }

    #[test]
    fn missing_required_field_fails() {
        let line = r#"{"url":"https://example.com/a","section":"news"}"#;
        assert!(serde_json::from_str::<DiscoveredArticle>(line).is_err());
    }
}
