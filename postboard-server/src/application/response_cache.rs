//! Cache for rendered responses.
//!
//! Entries only leave through TTL expiry or an explicit [`ResponseCache::invalidate`]
//! / [`ResponseCache::clear`]; writes to the store do not evict anything, so a
//! cached rendering may lag behind new posts for up to one TTL.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

/// Key prefix of the cached global feed.
pub const INDEX_CACHE_KEY: &str = "index_page";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;
    async fn clear(&self, key: &str) -> Result<(), CacheError>;
    async fn clear_all(&self) -> Result<(), CacheError>;
}

/// Backend that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheBackend;

#[async_trait]
impl CacheBackend for NoopCacheBackend {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn clear(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct ResponseCache {
    backend: Arc<dyn CacheBackend>,
}

impl ResponseCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopCacheBackend))
    }

    /// Returns the cached bytes for `key`, or renders, stores and returns them.
    ///
    /// Backend failures count as misses. Concurrent misses may all render; the
    /// last stored rendering wins.
    pub async fn get_or_render<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        render: F,
    ) -> Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, E>>,
    {
        match self.backend.get(key).await {
            Ok(Some(cached)) => {
                debug!(key, "response cache hit");
                return Ok(cached);
            }
            Ok(None) => debug!(key, "response cache miss"),
            Err(err) => warn!(key, error = %err, "response cache read failed, rendering"),
        }

        let rendered = render().await?;
        if let Err(err) = self.backend.set(key, rendered.clone(), ttl).await {
            warn!(key, error = %err, "response cache write failed");
        }
        Ok(rendered)
    }

    pub async fn invalidate(&self, key: &str) {
        if let Err(err) = self.backend.clear(key).await {
            warn!(key, error = %err, "response cache invalidation failed");
        }
    }

    pub async fn clear(&self) {
        if let Err(err) = self.backend.clear_all().await {
            warn!(error = %err, "response cache clear failed");
        }
    }
}

/// Cache key of one page of the global feed.
pub fn index_key(page: Option<&str>) -> String {
    format!("{INDEX_CACHE_KEY}:{}", page.unwrap_or_default())
}
