//! Key-value persistence used by the auth collaborator to keep sessions.
//!
//! Each execution mode has its own capability: [`SyncSupportedStorage`] for
//! blocking clients and [`AsyncSupportedStorage`] for async ones. Both ship
//! with an in-memory implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::mode::ExecutionMode;

/// Blocking key-value persistence.
pub trait SyncSupportedStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// Async key-value persistence.
#[async_trait]
pub trait AsyncSupportedStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Option<String>;
    async fn set_item(&self, key: &str, value: &str);
    async fn remove_item(&self, key: &str);
}

/// In-memory store for blocking clients.
#[derive(Debug, Default)]
pub struct SyncMemoryStorage {
    items: parking_lot::RwLock<HashMap<String, String>>,
}

impl SyncMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncSupportedStorage for SyncMemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items.write().insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.write().remove(key);
    }
}

/// In-memory store for async clients.
#[derive(Debug, Default)]
pub struct AsyncMemoryStorage {
    items: tokio::sync::RwLock<HashMap<String, String>>,
}

impl AsyncMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AsyncSupportedStorage for AsyncMemoryStorage {
    async fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().await.get(key).cloned()
    }

    async fn set_item(&self, key: &str, value: &str) {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    async fn remove_item(&self, key: &str) {
        self.items.write().await.remove(key);
    }
}

/// A shared handle to a persistence store of either mode.
///
/// Cloning shares the underlying store: a write through one clone is visible
/// through every other.
#[derive(Clone)]
pub enum SessionStorage {
    Sync(Arc<dyn SyncSupportedStorage>),
    Async(Arc<dyn AsyncSupportedStorage>),
}

impl SessionStorage {
    /// A fresh in-memory store for blocking clients.
    pub fn sync_memory() -> Self {
        Self::Sync(Arc::new(SyncMemoryStorage::new()))
    }

    /// A fresh in-memory store for async clients.
    pub fn async_memory() -> Self {
        Self::Async(Arc::new(AsyncMemoryStorage::new()))
    }

    /// A fresh in-memory store matching `mode`.
    pub fn for_mode(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Sync => Self::sync_memory(),
            ExecutionMode::Async => Self::async_memory(),
        }
    }

    /// The execution mode this store can serve.
    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Sync(_) => ExecutionMode::Sync,
            Self::Async(_) => ExecutionMode::Async,
        }
    }

    /// Whether both handles point at the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sync(a), Self::Sync(b)) => Arc::ptr_eq(a, b),
            (Self::Async(a), Self::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionStorage").field(&self.mode()).finish()
    }
}

impl From<Arc<dyn SyncSupportedStorage>> for SessionStorage {
    fn from(store: Arc<dyn SyncSupportedStorage>) -> Self {
        Self::Sync(store)
    }
}

impl From<Arc<dyn AsyncSupportedStorage>> for SessionStorage {
    fn from(store: Arc<dyn AsyncSupportedStorage>) -> Self {
        Self::Async(store)
    }
}
