use super::{Resource, ResourceKind};
use crate::config::SchemaConfig;
use crate::core::{Result, SchemaVersion};
use crate::storage::VersionStore;
use std::sync::Arc;
use tracing::debug;

/// What a concrete table or field knows about itself.
///
/// Implementors supply the DDL work; [`VersionedResource`] takes care of
/// recording the stored version around it.
pub trait SchemaDefinition: Send + Sync {
    fn name(&self) -> &str;

    fn group(&self) -> &str;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Table
    }

    fn version(&self) -> SchemaVersion;

    /// Creates the resource when `stored` is `None`, upgrades it otherwise.
    fn apply(&self, stored: Option<&SchemaVersion>) -> Result<()>;

    fn teardown(&self) -> Result<()>;
}

/// Binds a [`SchemaDefinition`] to a [`VersionStore`].
pub struct VersionedResource<D> {
    definition: D,
    store: Arc<dyn VersionStore>,
    version_key: String,
}

impl<D: SchemaDefinition> VersionedResource<D> {
    pub fn new(definition: D, store: Arc<dyn VersionStore>, key_prefix: &str) -> Self {
        let version_key = format!("{}{}", key_prefix, definition.name());
        Self {
            definition,
            store,
            version_key,
        }
    }

    /// Same as [`VersionedResource::new`] with the prefix taken from `config`.
    pub fn with_config(
        definition: D,
        store: Arc<dyn VersionStore>,
        config: &SchemaConfig,
    ) -> Self {
        Self::new(definition, store, &config.version_key_prefix)
    }

    pub fn definition(&self) -> &D {
        &self.definition
    }

    /// Key under which the stored version is persisted.
    pub fn version_key(&self) -> &str {
        &self.version_key
    }
}

impl<D: SchemaDefinition> Resource for VersionedResource<D> {
    fn name(&self) -> &str {
        self.definition.name()
    }

    fn group(&self) -> &str {
        self.definition.group()
    }

    fn kind(&self) -> ResourceKind {
        self.definition.kind()
    }

    fn declared_version(&self) -> SchemaVersion {
        self.definition.version()
    }

    fn stored_version(&self) -> Option<SchemaVersion> {
        self.store.get(&self.version_key)
    }

    fn create_or_upgrade(&self) -> Result<()> {
        let stored = self.stored_version();
        self.definition.apply(stored.as_ref())?;

        let declared = self.definition.version();
        self.store.set(&self.version_key, &declared)?;
        debug!(
            resource = self.definition.name(),
            from = ?stored,
            to = %declared,
            "stored version synced"
        );
        Ok(())
    }

    fn drop_schema(&self) -> Result<()> {
        self.definition.teardown()?;
        self.store.remove(&self.version_key)
    }
}
