use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::modules::catalog::domain::CacheRepository;
use crate::shared::errors::AppResult;

/// Cache-aside access shared by the caching decorators.
///
/// Every invalidation bumps a generation counter. A read that missed the cache
/// only stores what it loaded when no invalidation happened since the miss, so
/// a slow read of the old row cannot overwrite a newer write's invalidation.
pub(super) struct CacheAside {
    cache: Arc<dyn CacheRepository>,
    generation: Mutex<u64>,
}

impl CacheAside {
    pub(super) fn new(cache: Arc<dyn CacheRepository>) -> Self {
        Self {
            cache,
            generation: Mutex::new(0),
        }
    }

    /// Serve `key` from the cache, falling back to `load` and populating the cache.
    ///
    /// Cache failures never fail the read: the store stays authoritative.
    pub(super) async fn read_through<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        load: F,
    ) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    log::debug!("Cache HIT for {}", key);
                    return Ok(value);
                }
                Err(e) => log::warn!("Dropping undecodable cache entry {}: {}", key, e),
            },
            Ok(None) => log::debug!("Cache MISS for {}", key),
            Err(e) => log::warn!("Cache read failed for {}: {}", key, e),
        }

        let seen = *self.generation.lock().await;
        let value = load().await?;

        let raw = match serde_json::to_string(&value) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Failed to encode cache entry {}: {}", key, e);
                return Ok(value);
            }
        };

        // Check and store under the lock so no invalidation slips in between.
        let generation = self.generation.lock().await;
        if *generation != seen {
            log::debug!("Skipping cache fill for {}: invalidated during load", key);
            return Ok(value);
        }
        if let Err(e) = self.cache.set(key, raw, ttl).await {
            log::warn!("Cache write failed for {}: {}", key, e);
        }
        drop(generation);

        Ok(value)
    }

    /// Drop entity keys and list prefixes after a write. Errors are logged only.
    pub(super) async fn invalidate(&self, keys: &[String], prefixes: &[String]) {
        *self.generation.lock().await += 1;

        for key in keys {
            if let Err(e) = self.cache.delete(key).await {
                log::warn!("Cache invalidation failed for {}: {}", key, e);
            }
        }
        for prefix in prefixes {
            if let Err(e) = self.cache.delete_prefix(prefix).await {
                log::warn!("Cache invalidation failed for prefix {}: {}", prefix, e);
            }
        }
    }
}
