//! File-backed record persistence.
//!
//! Layout of the store file (JSON, human-inspectable):
//! ```text
//! {
//!   "schema_version": 1,
//!   "records": { "avatar": "https://models.example/a.glb" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current schema version of the record file.
const RECORD_SCHEMA_VERSION: u32 = 1;

/// The key under which the last resolved avatar URL is stored.
pub const AVATAR_URL_KEY: &str = "avatar";

/// Errors from record persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
}

/// Narrow key-value interface over durable session records.
///
/// Injected into the avatar handshake instead of ambient global storage so
/// tests can substitute an in-memory double.
pub trait RecordStore {
    /// Read a record. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Write a record, replacing any prior value. Writes are durable on return.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: RecordStore + ?Sized> RecordStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// On-disk serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordFile {
    schema_version: u32,
    records: BTreeMap<String, String>,
}

impl Default for RecordFile {
    fn default() -> Self {
        Self {
            schema_version: RECORD_SCHEMA_VERSION,
            records: BTreeMap::new(),
        }
    }
}

/// File-backed record store with schema versioning.
///
/// The whole map is rewritten on every `set`; the record set is tiny (one
/// entry today) so partial updates are not worth the complexity.
pub struct FileRecordStore {
    path: PathBuf,
    file: RecordFile,
}

impl FileRecordStore {
    /// Open or create a record store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = if path.exists() {
            let file: RecordFile = serde_json::from_reader(std::fs::File::open(&path)?)?;
            if file.schema_version != RECORD_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: file.schema_version,
                    expected_version: RECORD_SCHEMA_VERSION,
                });
            }
            file
        } else {
            RecordFile::default()
        };
        Ok(Self { path, file })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        serde_json::to_writer_pretty(std::fs::File::create(&self.path)?, &self.file)?;
        Ok(())
    }
}

impl RecordStore for FileRecordStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.file.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.file.records.insert(key.to_string(), value.to_string());
        self.save()?;
        tracing::debug!(key, "record persisted");
        Ok(())
    }
}

/// In-memory record store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: BTreeMap<String, String>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct pre-seeded with one record.
    pub fn with_record(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.records.insert(key.to_string(), value.to_string());
        store
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
