//! Everything a host needs to declare resources and drive migrations.
//!
//! ```ignore
//! use rustschema::prelude::*;
//! ```

pub use crate::{
    Builder, Collection, FileVersionStore, HostLifecycle, MemoryVersionStore, MigrationReport,
    ReadySignal, Register, Resource, ResourceClass, ResourceKind, ResourceRef, Result,
    SchemaConfig, SchemaDefinition, SchemaError, SchemaVersion, SharedResource, VersionStore,
    VersionedResource,
};
