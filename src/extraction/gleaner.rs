//! Jamaica Gleaner extractor with automatic V2 -> V1 fallback.
//!
//! V2 reads the page's JSON-LD structured data (headline, author,
//! publication date) and combines it with the article body selected by
//! CSS. V1 is the CSS-only strategy kept for resilience to structured-data
//! changes. The public [`GleanerExtractor`] tries the strategies in order
//! and fails only when every strategy fails.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::extraction::ArticleExtractor;
use crate::models::ExtractedArticleContent;

pub struct GleanerExtractor {
    strategies: Vec<(&'static str, Box<dyn ArticleExtractor>)>,
}

impl GleanerExtractor {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                ("v2 (JSON-LD + CSS)", Box::new(GleanerExtractorV2)),
                ("v1 (CSS-only)", Box::new(GleanerExtractorV1)),
            ],
        }
    }
}

impl Default for GleanerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleExtractor for GleanerExtractor {
    fn extract(&self, html: &str, url: &str) -> Result<ExtractedArticleContent> {
        let mut errors: Vec<String> = Vec::new();

        for (name, strategy) in &self.strategies {
            match strategy.extract(html, url) {
                Ok(content) => {
                    info!(url, extractor_version = name, "Extraction succeeded");
                    return Ok(content);
                }
                Err(err) => {
                    warn!(url, extractor_version = name, error = %err, "Extractor strategy failed");
                    errors.push(format!("{name}: {err}"));
                }
            }
        }

        Err(PipelineError::Parse(format!(
            "All extractors failed. {}",
            errors.join("; ")
        )))
    }
}

/// JSON-LD-first strategy.
struct GleanerExtractorV2;

impl ArticleExtractor for GleanerExtractorV2 {
    fn extract(&self, html: &str, url: &str) -> Result<ExtractedArticleContent> {
        let document = Html::parse_document(html);

        let article = find_json_ld_article(&document).ok_or_else(|| {
            PipelineError::Parse(format!("No Article-typed JSON-LD block found in {url}"))
        })?;

        let title = article
            .get("headline")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PipelineError::Parse("JSON-LD block has no headline".to_string()))?;

        let author = json_ld_person_name(&article);
        let published_date = article
            .get("datePublished")
            .and_then(Value::as_str)
            .and_then(parse_iso_datetime);

        let full_text = extract_body_text(&document)
            .ok_or_else(|| PipelineError::Parse("No article body found".to_string()))?;

        ExtractedArticleContent::new(title, full_text, author.map(clean_author), published_date)
            .map_err(|e| PipelineError::Parse(e.to_string()))
    }
}

/// CSS-only strategy, covering current and legacy page markup.
struct GleanerExtractorV1;

impl ArticleExtractor for GleanerExtractorV1 {
    fn extract(&self, html: &str, _url: &str) -> Result<ExtractedArticleContent> {
        let document = Html::parse_document(html);

        let title = select_first_text(&document, &["h1.article--title", "h1.title"])
            .ok_or_else(|| PipelineError::Parse("Could not extract title".to_string()))?;

        let full_text = extract_body_text(&document)
            .ok_or_else(|| PipelineError::Parse("No article body found".to_string()))?;

        let author =
            select_first_text(&document, &["div.article--authors", "a.author-term"])
                .map(clean_author);

        let published_date = select_attr(
            &document,
            "meta[property=\"article:published_time\"]",
            "content",
        )
        .or_else(|| select_attr(&document, "time[datetime]", "datetime"))
        .and_then(|raw| parse_iso_datetime(&raw));

        ExtractedArticleContent::new(title, full_text, author, published_date)
            .map_err(|e| PipelineError::Parse(e.to_string()))
    }
}

/// Concatenate paragraph text under the article body container.
fn extract_body_text(document: &Html) -> Option<String> {
    for container in ["div.article--body p", "div.article-content p"] {
        let selector = Selector::parse(container).expect("static selector");
        let paragraphs: Vec<String> = document
            .select(&selector)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if !paragraphs.is_empty() {
            return Some(paragraphs.join("\n\n"));
        }
    }
    None
}

/// First matching element's text for any of the given selectors.
fn select_first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let selector = Selector::parse(raw).expect("static selector");
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).expect("static selector");
    document
        .select(&selector)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Find the first JSON-LD block whose `@type` is `Article`. Blocks may be
/// single objects, arrays, or `@graph` containers.
fn find_json_ld_article(document: &Html) -> Option<Value> {
    let selector =
        Selector::parse("script[type=\"application/ld+json\"]").expect("static selector");

    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(_) => continue,
        };

        let candidates: Vec<&Value> = match &parsed {
            Value::Array(items) => items.iter().collect(),
            Value::Object(obj) => match obj.get("@graph").and_then(Value::as_array) {
                Some(graph) => graph.iter().collect(),
                None => vec![&parsed],
            },
            _ => continue,
        };

        for candidate in candidates {
            if is_article_typed(candidate) {
                return Some(candidate.clone());
            }
        }
    }

    None
}

fn is_article_typed(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(s)) => s == "Article",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Article")),
        _ => false,
    }
}

/// Author name from a JSON-LD `author` field, only when the author is
/// `Person`-typed.
fn json_ld_person_name(article: &Value) -> Option<String> {
    let author = article.get("author")?;
    let candidates: Vec<&Value> = match author {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    for candidate in candidates {
        if candidate.get("@type").and_then(Value::as_str) == Some("Person") {
            if let Some(name) = candidate.get("name").and_then(Value::as_str) {
                let name = name.trim();
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
    }
    None
}

/// Drop a trailing "/ Staff Reporter"-style role suffix.
fn clean_author(raw: String) -> String {
    raw.split('/').next().unwrap_or(&raw).trim().to_string()
}

fn parse_iso_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
