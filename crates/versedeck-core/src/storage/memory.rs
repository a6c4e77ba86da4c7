//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::session::SessionSnapshot;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    sessions: RwLock<HashMap<String, SessionSnapshot>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, snapshot: &SessionSnapshot) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let snapshot = snapshot.clone();
        Box::pin(async move {
            let mut sessions = self.sessions.write().map_err(lock_error)?;
            sessions.insert(key, snapshot);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<SessionSnapshot>> {
        let key = key.to_string();
        Box::pin(async move {
            let sessions = self.sessions.read().map_err(lock_error)?;
            sessions.get(&key).cloned().ok_or(StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut sessions = self.sessions.write().map_err(lock_error)?;
            sessions.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let sessions = self.sessions.read().map_err(lock_error)?;
            Ok(sessions.keys().cloned().collect())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let sessions = self.sessions.read().map_err(lock_error)?;
            Ok(sessions.contains_key(&key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SlideStore;
    use pollster::block_on;

    fn snapshot(name: &str) -> SessionSnapshot {
        SessionSnapshot::capture(name, &SlideStore::new())
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let saved = snapshot("Sunday");

        block_on(storage.save("test", &saved)).unwrap();
        let loaded = block_on(storage.load("test")).unwrap();

        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();

        assert!(!block_on(storage.exists("test")).unwrap());
        block_on(storage.save("test", &snapshot("a"))).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());

        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();

        block_on(storage.save("one", &snapshot("a"))).unwrap();
        block_on(storage.save("two", &snapshot("b"))).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"one".to_string()));
        assert!(list.contains(&"two".to_string()));
    }
}
