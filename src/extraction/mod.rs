//! Article content extraction.
//!
//! An [`ArticleExtractor`] turns raw HTML into structured content for one
//! publication. The [`ExtractionService`] owns the HTTP fetcher and
//! dispatches to an extractor by URL host.

pub mod gleaner;

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::fetch::HttpFetcher;
use crate::models::ExtractedArticleContent;

pub use gleaner::GleanerExtractor;

/// Strategy interface for per-publication HTML parsing.
pub trait ArticleExtractor: Send + Sync {
    fn extract(&self, html: &str, url: &str) -> Result<ExtractedArticleContent>;
}

/// Service interface used by the orchestrator. Split from the concrete
/// service so tests can substitute extraction wholesale.
#[async_trait]
pub trait ArticleExtraction: Send + Sync {
    async fn extract_article_content(&self, url: &str) -> Result<ExtractedArticleContent>;
}

/// Domain-dispatched extraction service.
///
/// Holds one pooled [`HttpFetcher`] for the lifetime of the service, so a
/// batch run reuses TCP connections across every article it fetches.
pub struct ExtractionService {
    fetcher: HttpFetcher,
    extractors: HashMap<String, Box<dyn ArticleExtractor>>,
}

impl ExtractionService {
    /// Production configuration: the Gleaner extractor on its domain.
    pub fn new() -> Self {
        let mut extractors: HashMap<String, Box<dyn ArticleExtractor>> = HashMap::new();
        extractors.insert(
            "jamaica-gleaner.com".to_string(),
            Box::new(GleanerExtractor::new()),
        );

        Self {
            fetcher: HttpFetcher::new(),
            extractors,
        }
    }

    /// Custom wiring, used by tests and alternative deployments.
    pub fn with_extractors(
        fetcher: HttpFetcher,
        extractors: HashMap<String, Box<dyn ArticleExtractor>>,
    ) -> Self {
        Self {
            fetcher,
            extractors,
        }
    }

    fn extractor_for(&self, url: &str) -> Result<&dyn ArticleExtractor> {
        let domain = normalize_domain(url)?;
        self.extractors
            .get(&domain)
            .map(|e| e.as_ref())
            .ok_or_else(|| {
                let mut supported: Vec<&str> =
                    self.extractors.keys().map(String::as_str).collect();
                supported.sort_unstable();
                PipelineError::UnsupportedDomain {
                    domain,
                    supported: supported.join(", "),
                }
            })
    }
}

impl Default for ExtractionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleExtraction for ExtractionService {
    async fn extract_article_content(&self, url: &str) -> Result<ExtractedArticleContent> {
        let extractor = self.extractor_for(url)?;
        let html = self.fetcher.fetch(url).await?;
        debug!(url, bytes = html.len(), "Fetched article HTML");
        extractor.extract(&html, url)
    }
}

/// Lowercase the URL host and strip a leading `www.`.
fn normalize_domain(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidInput(
            "URL cannot be empty".to_string(),
        ));
    }

    let parsed = url::Url::parse(trimmed)
        .map_err(|e| PipelineError::InvalidInput(format!("Invalid URL format: {trimmed}: {e}")))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| PipelineError::InvalidInput(format!("URL must include a host: {trimmed}")))?
        .to_lowercase();

    Ok(host.strip_prefix("www.").unwrap_or(&host).to_string())
}
