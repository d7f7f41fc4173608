// ============================================================================
// RustSchema Library
// ============================================================================
//
// Registry of versioned schema resources (tables and fields) plus the driver
// that applies pending ones exactly once, in registration order.

pub mod core;
pub mod config;
pub mod resource;
pub mod registry;
pub mod storage;
pub mod builder;
pub mod facade;
pub mod prelude;

// Re-export main types for convenience
pub use crate::core::{Result, SchemaError, SchemaVersion};
pub use crate::config::SchemaConfig;
pub use crate::resource::{
    Resource, ResourceClass, ResourceKind, ResourceRef, SchemaDefinition, SharedResource,
    VersionedResource,
};
pub use crate::registry::{Collection, Cursor, GroupSet, Snapshot};
pub use crate::storage::{FileVersionStore, MemoryVersionStore, VersionStore};
pub use crate::builder::{Builder, MigrationReport};
pub use crate::facade::{HostLifecycle, ReadySignal, Register};
