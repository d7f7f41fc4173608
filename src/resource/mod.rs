//! The resource contract consumed by the registry and the migration driver.
//!
//! A resource is an opaque, self-describing schema unit (a table or a
//! field). The core never looks inside it: it only asks for its identity,
//! its declared and stored versions, and tells it to apply or drop itself.

pub mod versioned;

use crate::core::{Result, SchemaVersion};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

pub use versioned::{SchemaDefinition, VersionedResource};

/// Which registry a resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Table,
    Field,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Table => write!(f, "table"),
            ResourceKind::Field => write!(f, "field"),
        }
    }
}

/// A named, versioned schema unit.
///
/// `create_or_upgrade` is expected to record `declared_version` as the
/// stored version on success, which is what makes repeated migration
/// passes converge. Both operations must be safe to retry.
pub trait Resource: Send + Sync {
    /// Unique key of the resource within its registry.
    fn name(&self) -> &str;

    fn group(&self) -> &str;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Table
    }

    fn declared_version(&self) -> SchemaVersion;

    /// Version recorded the last time the resource was applied, if ever.
    fn stored_version(&self) -> Option<SchemaVersion>;

    fn create_or_upgrade(&self) -> Result<()>;

    /// Drops the resource's storage.
    fn drop_schema(&self) -> Result<()>;

    /// True when the stored version is missing or lags the declared one.
    fn needs_update(&self) -> bool {
        match self.stored_version() {
            None => true,
            Some(stored) => stored < self.declared_version(),
        }
    }
}

impl fmt::Debug for dyn Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name())
            .field("group", &self.group())
            .field("kind", &self.kind())
            .field("declared_version", &self.declared_version())
            .field("stored_version", &self.stored_version())
            .finish()
    }
}

pub type SharedResource = Arc<dyn Resource>;

/// A resource type that can be constructed with no arguments.
#[derive(Clone, Copy)]
pub struct ResourceClass {
    type_name: &'static str,
    construct: fn() -> SharedResource,
}

impl ResourceClass {
    pub fn of<T>() -> Self
    where
        T: Resource + Default + 'static,
    {
        Self {
            type_name: type_name::<T>(),
            construct: || -> SharedResource { Arc::new(T::default()) },
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn instantiate(&self) -> SharedResource {
        (self.construct)()
    }
}

impl fmt::Debug for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClass")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Either a live resource or a class to build one from.
#[derive(Clone)]
pub enum ResourceRef {
    Instance(SharedResource),
    Class(ResourceClass),
}

impl ResourceRef {
    /// Normalizes to an instance, constructing one for a class.
    pub fn into_instance(self) -> SharedResource {
        match self {
            ResourceRef::Instance(resource) => resource,
            ResourceRef::Class(class) => class.instantiate(),
        }
    }
}

impl fmt::Debug for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRef::Instance(resource) => f.debug_tuple("Instance").field(resource).finish(),
            ResourceRef::Class(class) => f.debug_tuple("Class").field(class).finish(),
        }
    }
}

impl<T: Resource + 'static> From<Arc<T>> for ResourceRef {
    fn from(resource: Arc<T>) -> Self {
        ResourceRef::Instance(resource)
    }
}

impl From<SharedResource> for ResourceRef {
    fn from(resource: SharedResource) -> Self {
        ResourceRef::Instance(resource)
    }
}

impl From<ResourceClass> for ResourceRef {
    fn from(class: ResourceClass) -> Self {
        ResourceRef::Class(class)
    }
}
