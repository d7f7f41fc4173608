//! Durable record of which schema version each resource was last applied at.

pub mod memory;
pub mod persistence;

use crate::core::{Result, SchemaVersion};

pub use memory::MemoryVersionStore;
pub use persistence::{FileVersionStore, StoredVersionRecord};

/// Key/value store for applied schema versions.
///
/// Reads are infallible: a store keeps its records in memory and only
/// touches durable storage on mutation.
pub trait VersionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<SchemaVersion>;

    fn set(&self, key: &str, version: &SchemaVersion) -> Result<()>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    fn keys(&self) -> Vec<String>;
}
