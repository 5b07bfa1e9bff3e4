pub mod entity_cache;

pub use entity_cache::{entity_cache, CacheStats, EntityCache, InMemoryEntityCache};
