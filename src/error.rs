//! Error types shared across the ingestion pipeline.

use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main pipeline error type.
///
/// Each variant corresponds to a stage of the pipeline or a shared
/// resource. Stage handlers decide whether a variant is surfaced to the
/// caller or handled locally (retried, logged and skipped, or degraded).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller-supplied data failed validation (empty URL, bad schema,
    /// negative IDs, confidence out of range, empty input lists).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The extractor dispatcher has no strategy for this host.
    #[error("Unsupported domain: {domain}. Supported domains: {supported}")]
    UnsupportedDomain { domain: String, supported: String },

    /// HTTP fetch failed terminally (4xx, or retries exhausted).
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Extractor could not produce a title or a body of sufficient length.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A single classifier failed. Handled inside the classification
    /// service (logged and omitted from results).
    #[error("Classifier '{classifier}' failed: {message}")]
    Classifier { classifier: String, message: String },

    /// The classification service itself failed.
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Entity normalization agent or response parsing failed. Downgraded
    /// to "no entities" by the orchestrator.
    #[error("Entity normalization failed: {0}")]
    Normalization(String),

    /// Entity cache failure. Always handled locally by degrading to
    /// uncached operation.
    #[error("Cache error: {0}")]
    Cache(String),

    /// LLM provider returned an error or an unusable response.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Database failure inside a persistence operation. Unique violations
    /// on the article URL are not surfaced as this variant; they become an
    /// `ArticleStorageResult { stored: false, .. }`.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Anything that escaped the taxonomy above.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// HTTP fetch error, split by retry policy.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure or HTTP 5xx. Retried with exponential backoff; once
    /// retries are exhausted the fetcher converts this to `Terminal`.
    #[error("transient fetch failure for {url}: {message}")]
    Transient { url: String, message: String },

    /// HTTP 4xx or exhausted retries. Never retried.
    #[error("terminal fetch failure for {url} (status {status:?}): {message}")]
    Terminal {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The request was redirected to the publication's base page. The
    /// archive walker treats this as "date does not exist", distinct from
    /// a real 404.
    #[error("redirected to base page: {url} -> {redirect_url}")]
    RedirectedToBase { url: String, redirect_url: String },
}

impl FetchError {
    /// Whether the fetcher should attempt another try.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Terminal { status, .. } => *status,
            _ => None,
        }
    }
}

impl PipelineError {
    /// Short machine-readable name for telemetry (`error_type` key).
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "InvalidInput",
            PipelineError::UnsupportedDomain { .. } => "UnsupportedDomain",
            PipelineError::Fetch(FetchError::Transient { .. }) => "FetchTransient",
            PipelineError::Fetch(FetchError::Terminal { .. }) => "FetchTerminal",
            PipelineError::Fetch(FetchError::RedirectedToBase { .. }) => "RedirectedToBase",
            PipelineError::Parse(_) => "ParseError",
            PipelineError::Classifier { .. } => "ClassifierError",
            PipelineError::Classification(_) => "ClassificationServiceError",
            PipelineError::Normalization(_) => "NormalizationError",
            PipelineError::Cache(_) => "CacheError",
            PipelineError::Llm(_) => "LlmError",
            PipelineError::Storage(_) => "StorageError",
            PipelineError::Unexpected(_) => "UnexpectedError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_retryable() {
        let err = FetchError::Transient {
            url: "https://example.com".to_string(),
            message: "connection reset".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn terminal_is_not_retryable() {
        let err = FetchError::Terminal {
            url: "https://example.com".to_string(),
            status: Some(404),
            message: "not found".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn error_kind_names() {
        assert_eq!(
            PipelineError::InvalidInput("x".to_string()).kind(),
            "InvalidInput"
        );
        assert_eq!(
            PipelineError::Parse("no title".to_string()).kind(),
            "ParseError"
        );
    }
}
