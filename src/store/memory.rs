//! In-memory store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::EngineResult;

use super::{Collection, Store};

/// Keeps collections in a process-local map. Used by tests and by the
/// server when no data directory is given.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with raw collection text.
    pub fn with_contents(contents: impl IntoIterator<Item = (Collection, String)>) -> Self {
        Self {
            collections: RwLock::new(contents.into_iter().collect()),
        }
    }
}

impl Store for MemoryStore {
    fn get(&self, collection: Collection) -> EngineResult<Option<String>> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        Ok(collections.get(&collection).cloned())
    }

    fn set(&self, collection: Collection, contents: String) -> EngineResult<()> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        collections.insert(collection, contents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_collection_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get(Collection::Punches).unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let store = MemoryStore::new();
        store
            .set(Collection::DepartmentCaps, "[]".to_string())
            .unwrap();
        assert_eq!(
            store.get(Collection::DepartmentCaps).unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(store.get(Collection::Punches).unwrap(), None);
    }

    #[test]
    fn test_seeded_contents() {
        let store =
            MemoryStore::with_contents([(Collection::ComputationLog, "not json".to_string())]);
        assert_eq!(
            store.get(Collection::ComputationLog).unwrap().as_deref(),
            Some("not json")
        );
    }
}
