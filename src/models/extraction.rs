//! Extraction-layer models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Minimum body length for a meaningful article.
pub const MIN_FULL_TEXT_CHARS: usize = 50;

/// Structured article content produced by an extractor.
///
/// Produced per fetch and handed to classification; never persisted as a
/// distinct entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedArticleContent {
    pub title: String,
    pub full_text: String,
    pub author: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
}

impl ExtractedArticleContent {
    /// Build validated content. Title and text are trimmed; the body must
    /// be at least [`MIN_FULL_TEXT_CHARS`] characters after trimming.
    pub fn new(
        title: impl Into<String>,
        full_text: impl Into<String>,
        author: Option<String>,
        published_date: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Title cannot be empty".to_string(),
            ));
        }

        let full_text = full_text.into().trim().to_string();
        if full_text.chars().count() < MIN_FULL_TEXT_CHARS {
            return Err(PipelineError::InvalidInput(format!(
                "Full text must be at least {} characters",
                MIN_FULL_TEXT_CHARS
            )));
        }

        let author = author.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());

        Ok(Self {
            title,
            full_text,
            author,
            published_date,
        })
    }
}
