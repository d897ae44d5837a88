//! Session-scoped key-value storage

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Storage with browsing-session lifetime semantics: values live as long as
/// the running instance and are gone when it ends.
///
/// Operations are fallible so stores with real failure modes can be
/// injected; the watcher treats a store failure as a skipped cycle.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> crate::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: &str) -> crate::Result<()>;
}

/// In-memory session store used in production
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> crate::Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
