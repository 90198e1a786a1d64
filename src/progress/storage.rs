use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::progress::errors::ProgressError;

const TREE_PROGRESS: &str = "progress";

/// Durable string-keyed byte storage the progress gateway writes through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ProgressError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), ProgressError>;
    fn remove(&self, key: &str) -> Result<(), ProgressError>;
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct SledStoreBuilder {
    path: PathBuf,
    tree: String,
}

impl SledStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tree: TREE_PROGRESS.to_string(),
        }
    }

    /// Use a different tree inside the same database (e.g. one per profile).
    pub fn with_tree(mut self, tree: &str) -> Self {
        self.tree = tree.to_string();
        self
    }

    pub fn open(self) -> Result<SledStore, ProgressError> {
        SledStore::open_with_tree(self.path, &self.tree)
    }
}

/// Sled-backed persistence for player progress.
pub struct SledStore {
    _db: sled::Db,
    tree: sled::Tree,
}

impl SledStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressError> {
        Self::open_with_tree(path, TREE_PROGRESS)
    }

    fn open_with_tree<P: AsRef<Path>>(path: P, tree: &str) -> Result<Self, ProgressError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let tree = db.open_tree(tree)?;
        Ok(Self { _db: db, tree })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ProgressError> {
        Ok(self.tree.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), ProgressError> {
        self.tree.insert(key.as_bytes(), value)?;
        self.tree.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ProgressError> {
        self.tree.remove(key.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }
}

/// In-process store. All access happens on one thread, so a `RefCell` is enough.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ProgressError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), ProgressError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ProgressError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ProgressError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), ProgressError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), ProgressError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sled_store_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        assert_eq!(store.get("UserProgress").unwrap(), None);
        store.set("UserProgress", b"{}").unwrap();
        assert_eq!(store.get("UserProgress").unwrap(), Some(b"{}".to_vec()));
        store.remove("UserProgress").unwrap();
        assert_eq!(store.get("UserProgress").unwrap(), None);
    }

    #[test]
    fn test_builder_separates_trees() {
        let dir = tempdir().unwrap();
        let store = SledStoreBuilder::new(dir.path())
            .with_tree("profile_b")
            .open()
            .unwrap();
        store.set("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("a", b"1").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }
}
