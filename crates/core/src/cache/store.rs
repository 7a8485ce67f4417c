//! Session-scoped key/value storage.
//!
//! The result cache persists its whole table as one item in a `SessionStore`.
//! A store only needs to live as long as the session it belongs to.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::Error;

/// A flat, string-keyed store scoped to one session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_item(&self, name: &str) -> Result<Option<String>, Error>;

    async fn set_item(&self, name: &str, value: String) -> Result<(), Error>;

    async fn remove_item(&self, name: &str) -> Result<(), Error>;
}

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    async fn get_item(&self, name: &str) -> Result<Option<String>, Error> {
        (**self).get_item(name).await
    }

    async fn set_item(&self, name: &str, value: String) -> Result<(), Error> {
        (**self).set_item(name, value).await
    }

    async fn remove_item(&self, name: &str) -> Result<(), Error> {
        (**self).remove_item(name).await
    }
}

/// In-process store.
///
/// Clones share the same items, so a cache rebuilt on a clone sees what the
/// previous cache persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Storage("memory store lock poisoned".into())
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_item(&self, name: &str) -> Result<Option<String>, Error> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(name).cloned())
    }

    async fn set_item(&self, name: &str, value: String) -> Result<(), Error> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.insert(name.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, name: &str) -> Result<(), Error> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").await.unwrap(), None);

        store.set_item("k", "v1".into()).await.unwrap();
        store.set_item("k", "v2".into()).await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v2"));

        store.remove_item("k").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap(), None);
        // removing a missing item is not an error
        store.remove_item("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_items() {
        let store = MemoryStore::new();
        let reloaded = store.clone();
        store.set_item("k", "v".into()).await.unwrap();
        assert_eq!(reloaded.get_item("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn test_boxed_store() {
        let store: Box<dyn SessionStore> = Box::new(MemoryStore::new());
        store.set_item("k", "v".into()).await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v"));
    }
}
