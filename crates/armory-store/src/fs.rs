//! Filesystem-backed document store.
//!
//! Documents are pretty-printed JSON files under a root directory. Writes go
//! to a temporary sibling file which is flushed, synced, and then renamed over
//! the target, so the target always holds either the previous or the new
//! complete document.
//!
//! The rename step is only atomic where the host filesystem makes it so
//! (local POSIX filesystems). Network shares and some non-POSIX filesystems
//! give no such guarantee.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use tempfile::Builder;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// JSON files rooted at a data directory.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a document path to a file under the root, rejecting absolute
    /// paths and any `.`/`..` components.
    pub fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(path);
        let well_formed = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !well_formed {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl DocumentStore for JsonFileStore {
    fn read_document(&self, path: &str) -> StoreResult<Value> {
        let full = self.resolve(path)?;
        let bytes = match fs::read(&full) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(path.to_string()))
            }
            Err(e) => return Err(io_error(&full, e)),
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(format!("{path}: {e}")))
    }

    fn write_document(&self, path: &str, document: &Value) -> StoreResult<()> {
        let full = self.resolve(path)?;
        let parent = full
            .parent()
            .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;

        let mut bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        bytes.push(b'\n');

        let file_name = full
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document");
        // Dropping the temp file on any early return deletes it.
        let mut temp = Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| io_error(parent, e))?;
        temp.write_all(&bytes).map_err(|e| io_error(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| io_error(temp.path(), e))?;
        temp.persist(&full).map_err(|e| io_error(&full, e.error))?;

        debug!(path, bytes = bytes.len(), "document written");
        Ok(())
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        let full = self.resolve(path)?;
        Ok(full.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        (dir, store)
    }

    fn stray_temp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn write_then_read() {
        let (_dir, store) = temp_store();
        let doc = json!({"usa": [{"id": 1, "aircraftid": "p-51", "name": "P-51"}]});
        store.write_document("aviation/aircraft.json", &doc).unwrap();
        assert_eq!(store.read_document("aviation/aircraft.json").unwrap(), doc);
        assert!(store.exists("aviation/aircraft.json").unwrap());
    }

    #[test]
    fn overwrite_replaces_whole_document() {
        let (dir, store) = temp_store();
        store.write_document("nations.json", &json!([1, 2, 3])).unwrap();
        store.write_document("nations.json", &json!([4])).unwrap();
        assert_eq!(store.read_document("nations.json").unwrap(), json!([4]));
        assert!(stray_temp_files(dir.path()).is_empty());
    }

    #[test]
    fn missing_document_is_not_found() {
        let (_dir, store) = temp_store();
        let err = store.read_document("ground/tanks.json").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(p) if p == "ground/tanks.json"));
        assert!(store.load("ground/tanks.json").is_none());
        assert!(!store.exists("ground/tanks.json").unwrap());
    }

    #[test]
    fn corrupt_document_loads_as_absent() {
        let (dir, store) = temp_store();
        fs::write(dir.path().join("nations.json"), b"{ not json").unwrap();
        assert!(matches!(
            store.read_document("nations.json"),
            Err(StoreError::Serialization(_))
        ));
        assert!(store.load("nations.json").is_none());
    }

    #[test]
    fn failed_rename_leaves_target_and_no_temp_files() {
        let (dir, store) = temp_store();
        // A non-empty directory at the target path makes the rename fail.
        let target = dir.path().join("naval").join("coastal.json");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        let err = store
            .write_document("naval/coastal.json", &json!({"usa": []}))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(target.join("keep").exists());
        assert!(stray_temp_files(&dir.path().join("naval")).is_empty());
    }

    #[test]
    fn rejects_paths_escaping_root() {
        let (_dir, store) = temp_store();
        for bad in ["", "../etc/passwd", "/etc/passwd", "aviation/../../x.json", "./a.json"] {
            assert!(
                matches!(store.resolve(bad), Err(StoreError::InvalidPath(_))),
                "{bad} should be rejected"
            );
        }
    }
}
