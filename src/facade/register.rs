use super::lifecycle::{HostLifecycle, ReadySignal};
use crate::builder::{Builder, MigrationReport};
use crate::config::SchemaConfig;
use crate::core::Result;
use crate::registry::Collection;
use crate::resource::{
    ResourceKind, ResourceRef, SchemaDefinition, SharedResource, VersionedResource,
};
use crate::storage::VersionStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Entry point for registering and removing schema resources.
///
/// Before the host is ready, registration only records resources; the host
/// runs the pending migrations once from its ready hook
/// ([`Register::handle_ready`]). After that point every registration runs a
/// full migration pass, which may also apply unrelated pending resources.
///
/// # Examples
///
/// ```ignore
/// let ready = ReadySignal::new();
/// let mut register = Register::new(SchemaConfig::default(), Arc::new(ready.clone()))?;
///
/// register.table(Arc::new(OrdersTable::default()))?;
/// register.field(ResourceClass::of::<OrdersNoteField>())?;
///
/// ready.fire();
/// register.handle_ready()?;
/// ```
pub struct Register {
    tables: Collection,
    fields: Collection,
    config: SchemaConfig,
    lifecycle: Arc<dyn HostLifecycle>,
}

impl Register {
    pub fn new(config: SchemaConfig, lifecycle: Arc<dyn HostLifecycle>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tables: Collection::new(),
            fields: Collection::new(),
            config,
            lifecycle,
        })
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle.is_ready()
    }

    pub fn tables_registry(&self) -> &Collection {
        &self.tables
    }

    pub fn fields_registry(&self) -> &Collection {
        &self.fields
    }

    pub fn registry(&self, kind: ResourceKind) -> &Collection {
        match kind {
            ResourceKind::Table => &self.tables,
            ResourceKind::Field => &self.fields,
        }
    }

    /// Binds `definition` to `store` under the configured version key prefix.
    pub fn versioned<D: SchemaDefinition>(
        &self,
        definition: D,
        store: Arc<dyn VersionStore>,
    ) -> VersionedResource<D> {
        VersionedResource::with_config(definition, store, &self.config)
    }

    /// Migration driver over both registries.
    pub fn builder(&self) -> Builder<'_> {
        Builder::new(&self.tables, &self.fields).force(self.config.force_reapply)
    }

    /// Runs the migration pass owed at the host's ready point.
    pub fn handle_ready(&self) -> Result<MigrationReport> {
        info!(
            tables = self.tables.len(),
            fields = self.fields.len(),
            "host ready, applying registered schema"
        );
        self.builder().up()
    }

    pub fn table(&mut self, table: impl Into<ResourceRef>) -> Result<SharedResource> {
        self.add_to(ResourceKind::Table, table.into())
    }

    pub fn tables<I, R>(&mut self, tables: I) -> Result<&Collection>
    where
        I: IntoIterator<Item = R>,
        R: Into<ResourceRef>,
    {
        for table in tables {
            self.table(table)?;
        }
        Ok(&self.tables)
    }

    pub fn remove_table(&mut self, table: impl Into<ResourceRef>) -> Result<SharedResource> {
        self.remove_from(ResourceKind::Table, table.into())
    }

    pub fn field(&mut self, field: impl Into<ResourceRef>) -> Result<SharedResource> {
        self.add_to(ResourceKind::Field, field.into())
    }

    pub fn fields<I, R>(&mut self, fields: I) -> Result<&Collection>
    where
        I: IntoIterator<Item = R>,
        R: Into<ResourceRef>,
    {
        for field in fields {
            self.field(field)?;
        }
        Ok(&self.fields)
    }

    pub fn remove_field(&mut self, field: impl Into<ResourceRef>) -> Result<SharedResource> {
        self.remove_from(ResourceKind::Field, field.into())
    }

    /// Registers into the registry matching the resource's own kind.
    pub fn register(&mut self, resource: impl Into<ResourceRef>) -> Result<SharedResource> {
        let resource = resource.into().into_instance();
        self.add_to(resource.kind(), ResourceRef::Instance(resource))
    }

    pub fn register_many<I, R>(&mut self, resources: I) -> Result<Vec<SharedResource>>
    where
        I: IntoIterator<Item = R>,
        R: Into<ResourceRef>,
    {
        resources
            .into_iter()
            .map(|resource| self.register(resource))
            .collect()
    }

    /// Removes from the registry matching the resource's own kind.
    pub fn remove(&mut self, resource: impl Into<ResourceRef>) -> Result<SharedResource> {
        let resource = resource.into().into_instance();
        self.remove_from(resource.kind(), ResourceRef::Instance(resource))
    }

    fn add_to(&mut self, kind: ResourceKind, resource: ResourceRef) -> Result<SharedResource> {
        let resource = resource.into_instance();
        let stored = match kind {
            ResourceKind::Table => self.tables.add(resource),
            ResourceKind::Field => self.fields.add(resource),
        };
        debug!(resource = stored.name(), group = stored.group(), %kind, "registered");

        if self.is_ready() && self.config.apply_on_register {
            self.builder().up()?;
        } else {
            debug!(resource = stored.name(), "migration deferred");
        }

        Ok(stored)
    }

    fn remove_from(&mut self, kind: ResourceKind, resource: ResourceRef) -> Result<SharedResource> {
        let handle = resource.into_instance();
        // The registered entry is the singleton for its name; the caller's
        // handle only identifies it.
        let resource = match self.registry(kind).get(handle.name()) {
            Ok(registered) => registered,
            Err(_) => handle,
        };

        let dropped = if self.is_ready() && self.config.drop_on_remove {
            resource.drop_schema()
        } else {
            Ok(())
        };

        match kind {
            ResourceKind::Table => self.tables.remove(resource.name()),
            ResourceKind::Field => self.fields.remove(resource.name()),
        }

        if let Err(err) = dropped {
            warn!(
                resource = resource.name(),
                error = %err,
                "drop failed; resource unregistered but its storage may remain"
            );
            return Err(err);
        }

        debug!(resource = resource.name(), %kind, "unregistered");
        Ok(resource)
    }
}

impl Default for Register {
    /// Default configuration with a ready signal that has not fired.
    fn default() -> Self {
        Self {
            tables: Collection::new(),
            fields: Collection::new(),
            config: SchemaConfig::default(),
            lifecycle: Arc::new(ReadySignal::new()),
        }
    }
}
