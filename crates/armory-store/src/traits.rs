use serde_json::Value;
use tracing::warn;

use crate::error::StoreResult;

/// Named JSON document storage.
///
/// Paths are `/`-separated and relative to the store root. Implementations
/// must satisfy these invariants:
/// - A write either replaces the whole document or leaves the previous
///   document untouched. Readers never observe a partially written document.
/// - A failed write performs no partial mutation of the target.
/// - All I/O errors are returned to the caller; only [`DocumentStore::load`]
///   swallows them, after logging.
pub trait DocumentStore: Send + Sync {
    /// Read and parse a document.
    ///
    /// Returns `Err(StoreError::NotFound)` if the document does not exist.
    fn read_document(&self, path: &str) -> StoreResult<Value>;

    /// Serialize and write a document, replacing any previous version.
    fn write_document(&self, path: &str, document: &Value) -> StoreResult<()>;

    /// Check whether a document exists.
    fn exists(&self, path: &str) -> StoreResult<bool>;

    /// Load a document at startup.
    ///
    /// Any failure is logged and turned into `None`: a document that cannot
    /// be loaded is a recoverable state the caller must handle, never a crash.
    fn load(&self, path: &str) -> Option<Value> {
        match self.read_document(path) {
            Ok(document) => Some(document),
            Err(e) => {
                warn!(path, error = %e, "failed to load document");
                None
            }
        }
    }
}
