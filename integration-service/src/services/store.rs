//! Transient key-value store boundary.
//!
//! All per-flow state (OAuth state records, credential hand-off records)
//! lives behind this trait, keyed by tenant-scoped string keys with a TTL.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write a value with a per-key expiry. Overwrites any existing value.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), AppError>;

    /// Read a value; expired keys read as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Remove a key.
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Atomic get-and-delete. At most one of any number of concurrent
    /// callers observes the value.
    async fn take(&self, key: &str) -> Result<Option<String>, AppError>;
}

#[derive(Clone)]
pub struct RedisStore {
    _client: Client,
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn new(config: &crate::config::RedisConfig) -> Result<Self, AppError> {
        tracing::info!("Connecting to Redis");
        let client = Client::open(config.url.expose_secret().as_str())?;

        // Use ConnectionManager for automatic reconnection
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            AppError::InternalError(anyhow::anyhow!("Failed to connect to Redis: {}", e))
        })?;

        tracing::info!("Successfully connected to Redis");

        Ok(Self {
            _client: client,
            manager,
        })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let _: () = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.manager.clone();
        // GETDEL is a single server-side operation, so two racing consumers
        // cannot both observe the value.
        let value: Option<String> = redis::cmd("GETDEL").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }
}

/// In-memory store with the same expiry semantics, for tests and local
/// development without a Redis instance.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredValue>>,
}

struct StoredValue {
    value: String,
    expires_at: Instant,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at <= Instant::now()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredValue>>, AppError> {
        self.entries
            .lock()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), AppError> {
        self.lock()?.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(stored) if stored.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(stored) => Ok(Some(stored.value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut entries = self.lock()?;
        match entries.remove(key) {
            Some(stored) if stored.is_expired() => Ok(None),
            Some(stored) => Ok(Some(stored.value)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let store = MemoryStore::new();
        store.set("k", "v", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = MemoryStore::new();
        store.set("k", "first", 60).await.unwrap();
        store.set("k", "second", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let store = MemoryStore::new();
        store.set("k", "v", 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k2", "v", 0).await.unwrap();
        assert_eq!(store.take("k2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let store = MemoryStore::new();
        store.set("k", "v", 60).await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn take_returns_value_exactly_once() {
        let store = MemoryStore::new();
        store.set("k", "v", 60).await.unwrap();
        assert_eq!(store.take("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.take("k").await.unwrap(), None);
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
