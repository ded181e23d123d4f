//! Cache trait for key-value storage
//!
//! This trait abstracts caching backends, allowing users to swap between
//! in-memory, remote, or custom implementations. Identity lookups go through
//! the fetch-or-compute operation (`CacheExt::fetch`), never direct writes.

use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Cache trait for key-value storage with optional TTL
///
/// Note: This trait uses type-erased serialization to be object-safe.
/// Use the helper methods on [`CacheExt`] which handle serialization internally.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value from the cache as JSON bytes
    ///
    /// Returns `Ok(None)` if the key doesn't exist or has expired.
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value in the cache with optional TTL
    ///
    /// The value should be serialized JSON bytes. If `ttl` is `None`, the
    /// value persists until evicted (or until the backend's default TTL).
    async fn set_bytes(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Delete a value from the cache
    async fn delete(&self, key: &str) -> Result<()>;

    /// Clear all values from the cache
    async fn clear(&self) -> Result<()>;

    /// Check if the cache backend is healthy
    fn is_healthy(&self) -> bool;
}

#[async_trait]
impl<T: Cache + ?Sized> Cache for Arc<T> {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get_bytes(key).await
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        (**self).set_bytes(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }

    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }

    fn is_healthy(&self) -> bool {
        (**self).is_healthy()
    }
}

/// Helper trait for type-safe cache operations
///
/// This provides the generic `get`, `set`, and `fetch` methods that users
/// expect. Implementations use the object-safe `get_bytes` and `set_bytes`
/// internally.
pub trait CacheExt: Cache {
    /// Get a value from the cache
    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        if let Some(bytes) = self.get_bytes(key).await? {
            serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                crate::error::TollgateError::internal(format!("Failed to deserialize: {}", e))
            })
        } else {
            Ok(None)
        }
    }

    /// Set a value in the cache
    async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()>
    where
        T: serde::Serialize + Send + Sync,
    {
        let bytes = serde_json::to_vec(value).map_err(|e| {
            crate::error::TollgateError::internal(format!("Failed to serialize: {}", e))
        })?;
        self.set_bytes(key, bytes, ttl).await
    }

    /// Fetch a value, computing and storing it on a miss
    ///
    /// On a hit the cached value is returned and `compute` is never run. On a
    /// miss, `compute` runs once and its result is stored under `key` with the
    /// given `ttl` before being returned. A failed compute stores nothing.
    async fn fetch<T, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Result<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        if let Some(hit) = self.get(key).await? {
            return Ok(hit);
        }

        let value = compute().await?;
        self.set(key, &value, Some(ttl)).await?;
        Ok(value)
    }
}

// Blanket implementation - all Cache implementations get CacheExt for free
impl<T: Cache + ?Sized> CacheExt for T {}
