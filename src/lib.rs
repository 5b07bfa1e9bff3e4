//! Graftwatch backend
//!
//! A news-article ingestion and classification pipeline for a
//! government-accountability corpus. Discovers article URLs (RSS feeds
//! and a historical archive walker), extracts and classifies each
//! article with LLM-backed classifiers, normalizes the extracted
//! entities, and persists relevant articles with their classifications
//! and entity links in Postgres.

pub mod cache;
pub mod classification;
pub mod config;
pub mod database;
pub mod discovery;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod llm;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, DatabaseSettings, EntityCacheSettings, LlmSettings};
pub use database::{Database, DatabasePool};
pub use error::{FetchError, PipelineError, Result};
pub use models::{
    Article, ArticleEntity, ArticleStorageResult, Classification, ClassificationInput,
    ClassificationResult, ClassifierType, DiscoveredArticle, Entity, ExtractedArticleContent,
    NewsSource, NormalizedEntity, OrchestrationResult, RssFeedConfig,
};
pub use services::{BatchOptions, BatchProcessor, OrchestrationService, PersistenceService};
