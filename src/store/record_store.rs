//! File-backed append-if-absent record store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{MissingPolicy, StoreConfig, WritePolicy};
use crate::observability::metrics;
use crate::store::StoreError;

/// A single stored submission. Its text doubles as its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(String);

impl Record {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Record {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The mapping of all records, backed by one JSON document on disk.
///
/// The in-memory mapping only ever changes after the document holding the
/// change has been written, so a persist failure leaves both sides as they
/// were.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, Record>>,
    /// Held across check, write and commit under `WritePolicy::Serialized`.
    writer: Mutex<()>,
    write_policy: WritePolicy,
}

impl RecordStore {
    /// Load the document named by `config.path`.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let path = PathBuf::from(&config.path);

        let (records, bootstrap) = match fs::read(&path) {
            Ok(bytes) => {
                let records = serde_json::from_slice(&bytes).map_err(|source| {
                    StoreError::Corrupt {
                        path: path.clone(),
                        source,
                    }
                })?;
                (records, false)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => match config.on_missing {
                MissingPolicy::Fail => return Err(StoreError::Missing { path }),
                MissingPolicy::Create => (BTreeMap::new(), true),
            },
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let store = Self {
            path,
            records: RwLock::new(records),
            writer: Mutex::new(()),
            write_policy: config.write_policy,
        };

        if bootstrap {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| StoreError::Persist {
                    path: store.path.clone(),
                    source,
                })?;
            }
            store.persist(&BTreeMap::new())?;
            tracing::info!(path = %store.path.display(), "Store document created");
        }

        let count = store.len();
        metrics::record_store_size(count);
        tracing::info!(path = %store.path.display(), records = count, "Store loaded");
        Ok(store)
    }

    /// Location of the persisted document.
    pub fn document_path(&self) -> &Path {
        &self.path
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Record> {
        self.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of the current in-memory mapping.
    pub fn snapshot(&self) -> BTreeMap<String, Record> {
        self.read().clone()
    }

    /// Insert `key → record` unless `key` is already present.
    ///
    /// Returns `Ok(false)` without touching the disk for an existing key.
    /// Otherwise the whole mapping, including the new entry, is written to
    /// the document before the entry becomes visible in memory.
    pub fn append_if_absent(&self, key: &str, record: Record) -> Result<bool, StoreError> {
        let _guard = match self.write_policy {
            WritePolicy::Serialized => {
                Some(self.writer.lock().unwrap_or_else(PoisonError::into_inner))
            }
            WritePolicy::Unsynchronized => None,
        };

        let next = {
            let records = self.read();
            if records.contains_key(key) {
                return Ok(false);
            }
            let mut next = records.clone();
            next.insert(key.to_owned(), record.clone());
            next
        };

        self.persist(&next)?;

        let count = {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            records.insert(key.to_owned(), record);
            records.len()
        };
        metrics::record_store_size(count);
        Ok(true)
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Record>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the document with `records` via a temp file and rename.
    fn persist(&self, records: &BTreeMap<String, Record>) -> Result<(), StoreError> {
        let persist_error = |source| StoreError::Persist {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(records)
            .map_err(|e| persist_error(std::io::Error::from(e)))?;

        let tmp_path = self.temp_path();
        fs::write(&tmp_path, content).map_err(persist_error)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(persist_error(e));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("store");
        self.path
            .with_file_name(format!(".{}-{}.tmp", file_name, Uuid::new_v4()))
    }
}
