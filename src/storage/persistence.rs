//! JSON-file backed version store.

use super::VersionStore;
use crate::core::{Result, SchemaError, SchemaVersion};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One persisted entry of the version file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVersionRecord {
    pub version: SchemaVersion,
    pub applied_at: DateTime<Utc>,
}

/// Keeps every record in memory and rewrites the whole file on each
/// mutation (`<path>.tmp` then rename), so a crash leaves either the old
/// or the new document on disk.
pub struct FileVersionStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, StoredVersionRecord>>,
}

impl FileVersionStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records: BTreeMap<String, StoredVersionRecord> = if path.exists() {
            let bytes = fs::read(&path)
                .map_err(|e| SchemaError::IoError(format!("read {}: {}", path.display(), e)))?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                BTreeMap::new()
            } else {
                serde_json::from_slice(&bytes).map_err(|e| {
                    SchemaError::Serialization(format!("parse {}: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!("opened version store {} ({} records)", path.display(), records.len());

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full record for `key`, including when it was applied.
    pub fn record(&self, key: &str) -> Option<StoredVersionRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.get(key).cloned()
    }

    /// `<path>.tmp`, so stores sharing a file stem never share a temp file.
    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn write_file(&self, records: &BTreeMap<String, StoredVersionRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SchemaError::IoError(format!("create {}: {}", parent.display(), e))
                })?;
            }
        }

        let tmp_path = self.tmp_path();
        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| SchemaError::Serialization(format!("serialize version store: {}", e)))?;

        fs::write(&tmp_path, json).map_err(|e| {
            warn!("version store write failed at {}: {}", tmp_path.display(), e);
            SchemaError::IoError(e.to_string())
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            warn!("version store rename failed for {}: {}", self.path.display(), e);
            SchemaError::IoError(e.to_string())
        })?;

        Ok(())
    }
}

impl VersionStore for FileVersionStore {
    fn get(&self, key: &str) -> Option<SchemaVersion> {
        self.record(key).map(|record| record.version)
    }

    fn set(&self, key: &str, version: &SchemaVersion) -> Result<()> {
        let mut records = self.records.lock()?;
        let previous = records.insert(
            key.to_string(),
            StoredVersionRecord {
                version: *version,
                applied_at: Utc::now(),
            },
        );

        if let Err(err) = self.write_file(&records) {
            // Keep memory in line with what is on disk.
            match previous {
                Some(previous) => records.insert(key.to_string(), previous),
                None => records.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut records = self.records.lock()?;
        let Some(previous) = records.remove(key) else {
            return Ok(());
        };

        if let Err(err) = self.write_file(&records) {
            records.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.keys().cloned().collect()
    }
}
