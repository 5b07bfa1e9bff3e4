//! In-memory cache for normalized entities with TTL and LRU eviction.
//!
//! Every hit avoids an LLM round-trip, so the cache is deliberately
//! generous (100k entries, 14-day TTL by default). All operations are
//! serialized by a single async mutex; batch operations run as sequential
//! single-entry operations so TTL, LRU and stats accounting stay exact.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::EntityCacheSettings;
use crate::error::Result;
use crate::models::NormalizedEntity;

/// Cache abstraction used by the entity normalizer. Alternative backends
/// (external stores) can fail, hence the fallible signatures; the
/// normalizer degrades to uncached operation on any error.
#[async_trait]
pub trait EntityCache: Send + Sync {
    async fn get(&self, entity_name: &str) -> Result<Option<NormalizedEntity>>;
    async fn set(&self, entity_name: &str, normalized: NormalizedEntity) -> Result<()>;
    async fn get_many(&self, entity_names: &[String])
        -> Result<HashMap<String, NormalizedEntity>>;
    async fn set_many(&self, normalizations: HashMap<String, NormalizedEntity>) -> Result<()>;
    async fn stats(&self) -> CacheStats;
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub max_size: usize,
    pub hit_rate: f64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_sets: u64,
    pub ttl_seconds: u64,
}

struct CacheEntry {
    entity: NormalizedEntity,
    inserted_at: Instant,
    recency: u64,
}

#[derive(Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
    total_sets: u64,
}

struct CacheState {
    entries: HashMap<String, CacheEntry>,
    // recency stamp -> cache key; the smallest stamp is least recently used
    recency_index: BTreeMap<u64, String>,
    next_recency: u64,
    counters: Counters,
}

pub struct InMemoryEntityCache {
    state: Mutex<CacheState>,
    max_size: usize,
    ttl: Duration,
}

impl InMemoryEntityCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        info!(max_size, ttl_secs = ttl.as_secs(), "Initialized entity cache");
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                recency_index: BTreeMap::new(),
                next_recency: 0,
                counters: Counters::default(),
            }),
            max_size,
            ttl,
        }
    }

    pub fn with_settings(settings: EntityCacheSettings) -> Self {
        Self::new(settings.max_size, settings.ttl)
    }

    /// Drop all entries and reset counters.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        let count = state.entries.len();
        state.entries.clear();
        state.recency_index.clear();
        state.next_recency = 0;
        state.counters = Counters::default();
        info!(removed = count, "Entity cache cleared");
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        entry.inserted_at.elapsed() > self.ttl
    }
}

/// Cache key: lowercased with whitespace runs collapsed to single spaces
/// and outer whitespace trimmed, so `"  HON.   REID "` and `"hon. reid"`
/// collide.
fn normalize_key(entity_name: &str) -> String {
    entity_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            self.recency_index.remove(&entry.recency);
            entry.recency = self.next_recency;
            self.recency_index.insert(self.next_recency, key.to_string());
            self.next_recency += 1;
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.recency_index.remove(&entry.recency);
        Some(entry)
    }

    fn evict_lru(&mut self) -> Option<String> {
        let (&stamp, key) = self.recency_index.iter().next()?;
        let key = key.clone();
        self.recency_index.remove(&stamp);
        self.entries.remove(&key);
        Some(key)
    }
}

#[async_trait]
impl EntityCache for InMemoryEntityCache {
    async fn get(&self, entity_name: &str) -> Result<Option<NormalizedEntity>> {
        let key = normalize_key(entity_name);
        let mut state = self.state.lock().await;

        let expired = match state.entries.get(&key) {
            None => {
                state.counters.misses += 1;
                debug!(entity = entity_name, "Cache miss");
                return Ok(None);
            }
            Some(entry) => self.is_expired(entry),
        };

        if expired {
            state.remove(&key);
            state.counters.expirations += 1;
            state.counters.misses += 1;
            debug!(entity = entity_name, "Cache entry expired");
            return Ok(None);
        }

        state.touch(&key);
        state.counters.hits += 1;
        let entity = state.entries.get(&key).map(|e| e.entity.clone());
        Ok(entity)
    }

    async fn set(&self, entity_name: &str, normalized: NormalizedEntity) -> Result<()> {
        let key = normalize_key(entity_name);
        let mut state = self.state.lock().await;

        // Overwrites reset both position and timestamp.
        state.remove(&key);

        if state.entries.len() >= self.max_size {
            if let Some(evicted) = state.evict_lru() {
                state.counters.evictions += 1;
                warn!(
                    evicted,
                    max_size = self.max_size,
                    "Cache full, evicted least recently used entry"
                );
            }
        }

        let recency = state.next_recency;
        state.next_recency += 1;
        state.recency_index.insert(recency, key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                entity: normalized,
                inserted_at: Instant::now(),
                recency,
            },
        );
        state.counters.total_sets += 1;
        Ok(())
    }

    async fn get_many(
        &self,
        entity_names: &[String],
    ) -> Result<HashMap<String, NormalizedEntity>> {
        let mut results = HashMap::new();
        for name in entity_names {
            if let Some(entity) = self.get(name).await? {
                results.insert(name.clone(), entity);
            }
        }
        debug!(
            hits = results.len(),
            misses = entity_names.len() - results.len(),
            "Cache batch lookup"
        );
        Ok(results)
    }

    async fn set_many(&self, normalizations: HashMap<String, NormalizedEntity>) -> Result<()> {
        for (name, normalized) in normalizations {
            self.set(&name, normalized).await?;
        }
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let total_requests = state.counters.hits + state.counters.misses;
        let hit_rate = if total_requests > 0 {
            state.counters.hits as f64 / total_requests as f64
        } else {
            0.0
        };

        CacheStats {
            hits: state.counters.hits,
            misses: state.counters.misses,
            size: state.entries.len(),
            max_size: self.max_size,
            hit_rate,
            evictions: state.counters.evictions,
            expirations: state.counters.expirations,
            total_sets: state.counters.total_sets,
            ttl_seconds: self.ttl.as_secs(),
        }
    }
}

static ENTITY_CACHE: OnceLock<Arc<InMemoryEntityCache>> = OnceLock::new();

/// Process-wide singleton cache shared by every normalizer instance.
/// Settings are honored only on the first call; later parameters are
/// ignored.
pub fn entity_cache(settings: EntityCacheSettings) -> Arc<InMemoryEntityCache> {
    ENTITY_CACHE
        .get_or_init(|| Arc::new(InMemoryEntityCache::with_settings(settings)))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(original: &str, normalized: &str) -> NormalizedEntity {
        NormalizedEntity::new(original, normalized, 0.95, "test", "").unwrap()
    }

    fn cache(max_size: usize) -> InMemoryEntityCache {
        InMemoryEntityCache::new(max_size, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn set_then_get_round_trip() {
        let cache = cache(10);
        cache.set("OCG", entity("OCG", "ocg")).await.unwrap();

        let hit = cache.get("OCG").await.unwrap().unwrap();
        assert_eq!(hit.normalized_value, "ocg");

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.total_sets, 1);
    }

    #[tokio::test]
    async fn key_normalization_collides_variant_spellings() {
        let cache = cache(10);
        cache
            .set("  HON.   REID  ", entity("Hon. Reid", "ruel_reid"))
            .await
            .unwrap();

        let hit = cache.get("hon. reid").await.unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn miss_increments_counter() {
        let cache = cache(10);
        assert!(cache.get("unknown").await.unwrap().is_none());
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 0.0);
    }

    #[tokio::test]
    async fn ttl_expiry_counts_expiration_and_miss() {
        let cache = InMemoryEntityCache::new(10, Duration::from_millis(20));
        cache.set("OCG", entity("OCG", "ocg")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(cache.get("OCG").await.unwrap().is_none());
        let stats = cache.stats().await;
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 0);
    }

    #[tokio::test]
    async fn lru_eviction_order() {
        let cache = cache(2);
        cache.set("a", entity("a", "a")).await.unwrap();
        cache.set("b", entity("b", "b")).await.unwrap();
        // Touch "a" so "b" becomes least recently used.
        cache.get("a").await.unwrap();
        cache.set("c", entity("c", "c")).await.unwrap();

        assert!(cache.get("a").await.unwrap().is_some());
        assert!(cache.get("b").await.unwrap().is_none());
        assert!(cache.get("c").await.unwrap().is_some());

        let stats = cache.stats().await;
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.size, 2);
    }

    #[tokio::test]
    async fn overwrite_resets_recency() {
        let cache = cache(2);
        cache.set("a", entity("a", "a1")).await.unwrap();
        cache.set("b", entity("b", "b")).await.unwrap();
        // Overwriting "a" makes "b" the LRU entry.
        cache.set("a", entity("a", "a2")).await.unwrap();
        cache.set("c", entity("c", "c")).await.unwrap();

        assert_eq!(
            cache.get("a").await.unwrap().unwrap().normalized_value,
            "a2"
        );
        assert!(cache.get("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_many_returns_hits_only() {
        let cache = cache(10);
        cache.set("OCG", entity("OCG", "ocg")).await.unwrap();

        let names = vec!["OCG".to_string(), "Unknown".to_string()];
        let results = cache.get_many(&names).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.contains_key("OCG"));
    }

    #[tokio::test]
    async fn set_many_stores_all() {
        let cache = cache(10);
        let mut batch = HashMap::new();
        batch.insert("OCG".to_string(), entity("OCG", "ocg"));
        batch.insert(
            "Ministry of Education".to_string(),
            entity("Ministry of Education", "ministry_of_education"),
        );
        cache.set_many(batch).await.unwrap();

        let stats = cache.stats().await;
        assert_eq!(stats.size, 2);
        assert_eq!(stats.total_sets, 2);
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let cache = cache(10);
        cache.set("a", entity("a", "a")).await.unwrap();
        cache.get("a").await.unwrap();
        cache.clear().await;

        let stats = cache.stats().await;
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.total_sets, 0);
    }

    #[tokio::test]
    async fn singleton_ignores_later_settings() {
        let first = entity_cache(EntityCacheSettings::default());
        let second = entity_cache(EntityCacheSettings {
            max_size: 1,
            ttl: Duration::from_secs(1),
        });
        assert!(Arc::ptr_eq(&first, &second));
    }
}
