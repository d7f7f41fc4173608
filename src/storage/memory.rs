use super::VersionStore;
use crate::core::{Result, SchemaVersion};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Process-local version store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryVersionStore {
    versions: Mutex<BTreeMap<String, SchemaVersion>>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionStore for MemoryVersionStore {
    fn get(&self, key: &str) -> Option<SchemaVersion> {
        // A poisoned map still holds consistent entries: every write is a single insert.
        let versions = self.versions.lock().unwrap_or_else(|e| e.into_inner());
        versions.get(key).copied()
    }

    fn set(&self, key: &str, version: &SchemaVersion) -> Result<()> {
        self.versions.lock()?.insert(key.to_string(), *version);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.versions.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let versions = self.versions.lock().unwrap_or_else(|e| e.into_inner());
        versions.keys().cloned().collect()
    }
}
