use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use moka::Expiry;
use moka::future::Cache;
use tracing::info;

use crate::application::response_cache::{CacheBackend, CacheError};

#[derive(Clone)]
struct CachedBody {
    body: Bytes,
    ttl: Duration,
}

/// Expires every entry after the TTL it was stored with.
struct PerEntryTtl;

impl Expiry<String, CachedBody> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedBody,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedBody,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process bounded cache backend.
#[derive(Clone)]
pub struct MemoryCacheBackend {
    cache: Cache<String, CachedBody>,
}

impl MemoryCacheBackend {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        info!(max_capacity, "in-memory response cache initialized");
        Self { cache }
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.body))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.cache
            .insert(key.to_string(), CachedBody { body: value, ttl })
            .await;
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), CacheError> {
        self.cache.invalidate_all();
        info!("response cache cleared");
        Ok(())
    }
}
