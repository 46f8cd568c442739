use std::io::Write;
use std::path::{Path, PathBuf};

use crate::client::SongRecord;
use crate::error::StorageError;

/// Writes one JSON document per record, keyed by record id.
///
/// Distinct ids map to distinct paths, so workers never write the same
/// file. Rerunning with the same input overwrites files with identical bytes.
pub struct RecordStore {
    output_directory: PathBuf,
}

impl RecordStore {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Path a record with `id` is stored at.
    pub fn path_for(&self, id: &str) -> Result<PathBuf, StorageError> {
        if !is_safe_key(id) {
            return Err(StorageError::InvalidKey(id.to_string()));
        }
        Ok(self.output_directory.join(format!("{}.json", id)))
    }

    pub fn ensure_directory(&self) -> Result<(), StorageError> {
        if !self.output_directory.exists() {
            std::fs::create_dir_all(&self.output_directory).map_err(|e| {
                StorageError::CreateDirectory {
                    path: self.output_directory.clone(),
                    source: e,
                }
            })?;
        }
        Ok(())
    }

    /// Serializes the record's payload to `<output_directory>/<id>.json`.
    pub fn store(&self, record: &SongRecord) -> Result<PathBuf, StorageError> {
        let path = self.path_for(&record.id)?;
        let content =
            serde_json::to_vec(&record.payload).map_err(|e| StorageError::Serialize {
                id: record.id.clone(),
                source: e,
            })?;

        self.write_atomic(&path, &content)?;
        Ok(path)
    }

    /// Writes to a sibling temp file and renames it over `path`, so a
    /// reader never observes a half-written document.
    fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
        let tmp_path = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4()));
        let write_err = |source| StorageError::WriteFile {
            path: path.to_path_buf(),
            source,
        };

        let result = std::fs::File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(content)?;
                file.sync_all()
            })
            .and_then(|_| std::fs::rename(&tmp_path, path));

        if let Err(e) = result {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        Ok(())
    }
}

fn is_safe_key(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(id: &str, payload: serde_json::Value) -> SongRecord {
        SongRecord {
            id: id.to_string(),
            title: "Yesterday".to_string(),
            artist: "The Beatles".to_string(),
            payload,
        }
    }

    #[test]
    fn test_store_writes_payload_at_id_path() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path());

        let payload = json!({ "id": 42, "title": "Yesterday" });
        let path = store.store(&record("42", payload.clone())).unwrap();

        assert_eq!(path, temp_dir.path().join("42.json"));
        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, payload);
    }

    #[test]
    fn test_store_is_byte_identical_on_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path());
        let rec = record("7", json!({ "b": [1, 2], "a": { "z": null, "y": "x" } }));

        let path = store.store(&rec).unwrap();
        let first = std::fs::read(&path).unwrap();
        store.store(&rec).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_store_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path());
        store.store(&record("1", json!({}))).unwrap();
        store.store(&record("2", json!({}))).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["1.json", "2.json"]);
    }

    #[test]
    fn test_unsafe_ids_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path());

        for id in ["", "../escape", "a/b", "x.y"] {
            let result = store.store(&record(id, json!({})));
            assert!(
                matches!(result, Err(StorageError::InvalidKey(_))),
                "id {:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_ensure_directory_creates_nested_path() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("deep/nested/dataset");
        let store = RecordStore::new(&nested);

        store.ensure_directory().unwrap();
        assert!(nested.is_dir());
        // Idempotent
        store.ensure_directory().unwrap();
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("does-not-exist"));

        let result = store.store(&record("42", json!({})));
        assert!(matches!(result, Err(StorageError::WriteFile { .. })));
    }

    #[test]
    fn test_output_directory_accessor() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path());
        assert_eq!(store.output_directory(), temp_dir.path());
    }
}
