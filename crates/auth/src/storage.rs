//! Key/value storage seam for persisted session state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Storage error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// String key/value storage scoped to one user profile.
///
/// Batch writes and removals must be applied as a unit: a concurrent `get`
/// sees either none or all of a batch.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read one key.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Read several keys from one consistent snapshot, in `keys` order.
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError>;

    /// Write all entries as one unit.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    /// Remove all keys as one unit. Missing keys are not an error.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;

    /// Write all entries as one unit if `expected.0` currently holds
    /// `expected.1` (`None` meaning absent). Returns whether it wrote.
    ///
    /// The check and the write are a single step: no other write can land
    /// between them.
    async fn set_many_if(
        &self,
        expected: (&str, Option<&str>),
        entries: &[(&str, String)],
    ) -> Result<bool, StorageError>;

    /// Remove all keys as one unit under the same precondition as
    /// [`KeyValueStore::set_many_if`].
    async fn remove_many_if(
        &self,
        expected: (&str, Option<&str>),
        keys: &[&str],
    ) -> Result<bool, StorageError>;
}

fn holds(entries: &HashMap<String, String>, (key, value): (&str, Option<&str>)) -> bool {
    entries.get(key).map(String::as_str) == value
}

/// In-process storage.
///
/// Cheap to clone; clones share the same map, which is how several client
/// handles in one process observe the same session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw write of a single key, bypassing any session-level checks.
    pub async fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().await.insert(key.into(), value.into());
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let guard = self.entries.read().await;
        Ok(keys.iter().map(|key| guard.get(*key).cloned()).collect())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut guard = self.entries.write().await;
        for (key, value) in entries {
            guard.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut guard = self.entries.write().await;
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }

    async fn set_many_if(
        &self,
        expected: (&str, Option<&str>),
        entries: &[(&str, String)],
    ) -> Result<bool, StorageError> {
        let mut guard = self.entries.write().await;
        if !holds(&guard, expected) {
            return Ok(false);
        }
        for (key, value) in entries {
            guard.insert((*key).to_string(), value.clone());
        }
        Ok(true)
    }

    async fn remove_many_if(
        &self,
        expected: (&str, Option<&str>),
        keys: &[&str],
    ) -> Result<bool, StorageError> {
        let mut guard = self.entries.write().await;
        if !holds(&guard, expected) {
            return Ok(false);
        }
        for key in keys {
            guard.remove(*key);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_entries() {
        let a = MemoryStore::new();
        let b = a.clone();

        a.set_many(&[("k", "v".to_string())]).await.unwrap();
        assert_eq!(b.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(
            b.get_many(&["missing", "k"]).await.unwrap(),
            vec![None, Some("v".to_string())]
        );

        b.remove_many(&["k", "missing"]).await.unwrap();
        assert!(a.is_empty().await);
    }

    #[tokio::test]
    async fn conditional_batches_check_the_expected_value() {
        let store = MemoryStore::new();
        store.insert("owner", "r1").await;

        let wrote = store
            .set_many_if(("owner", Some("r0")), &[("token", "t".to_string())])
            .await
            .unwrap();
        assert!(!wrote);
        assert_eq!(store.get("token").await.unwrap(), None);

        let wrote = store
            .set_many_if(("owner", Some("r1")), &[("token", "t".to_string())])
            .await
            .unwrap();
        assert!(wrote);
        assert_eq!(store.get("token").await.unwrap().as_deref(), Some("t"));

        assert!(!store.remove_many_if(("owner", None), &["owner", "token"]).await.unwrap());
        assert_eq!(store.len().await, 2);

        assert!(store.remove_many_if(("owner", Some("r1")), &["owner", "token"]).await.unwrap());
        assert!(store.is_empty().await);

        // Absent is a precondition too.
        assert!(store.remove_many_if(("owner", None), &["owner"]).await.unwrap());
    }
}
