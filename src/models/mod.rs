pub mod classification;
pub mod discovery;
pub mod domain;
pub mod extraction;
pub mod orchestration;

pub use classification::{
    ClassificationInput, ClassificationResult, ClassifierType, EntityNormalizationResult,
    NormalizedEntity,
};
pub use discovery::{DiscoveredArticle, RssFeedConfig};
pub use domain::{
    Article, ArticleEntity, ArticleStorageResult, Classification, Entity, NewsSource,
};
pub use extraction::ExtractedArticleContent;
pub use orchestration::OrchestrationResult;
