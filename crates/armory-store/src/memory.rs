use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// In-memory, HashMap-based document store.
///
/// Intended for tests and embedding. Writes can be switched to fail on demand
/// so callers can exercise their rollback paths.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, Value>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with documents.
    pub fn with_documents<I, P>(documents: I) -> Self
    where
        I: IntoIterator<Item = (P, Value)>,
        P: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.documents.write().expect("lock poisoned");
            map.extend(documents.into_iter().map(|(path, doc)| (path.into(), doc)));
        }
        store
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current content of a document, if present.
    pub fn snapshot(&self, path: &str) -> Option<Value> {
        self.documents.read().ok()?.get(path).cloned()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn read_document(&self, path: &str) -> StoreResult<Value> {
        let map = self
            .documents
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        map.get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn write_document(&self, path: &str, document: &Value) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::ReadOnly);
        }
        let mut map = self
            .documents
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        map.insert(path.to_string(), document.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        let map = self
            .documents
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(map.contains_key(path))
    }
}
