//! Narrow SQL operations over caller-supplied connections.
//!
//! Every method takes `&mut PgConnection`, so the same repository call
//! works on a pooled connection or inside a caller-managed transaction.
//! Services own the transaction boundary; callers own connection
//! checkout.

pub mod article;
pub mod article_entity;
pub mod classification;
pub mod entity;
pub mod news_source;

pub use article::ArticleRepository;
pub use article_entity::ArticleEntityRepository;
pub use classification::ClassificationRepository;
pub use entity::EntityRepository;
pub use news_source::NewsSourceRepository;
