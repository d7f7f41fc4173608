use crate::core::{Result, SchemaError};

pub const DEFAULT_VERSION_KEY_PREFIX: &str = "rustschema_version_";

/// Schema registration configuration
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    /// Prefix of every persisted version key
    pub version_key_prefix: String,

    /// After ready, run a migration pass whenever a resource is registered
    pub apply_on_register: bool,

    /// After ready, drop a resource's storage before unregistering it
    pub drop_on_remove: bool,

    /// Apply every registered resource on `up`, not only pending ones
    pub force_reapply: bool,
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self {
            version_key_prefix: DEFAULT_VERSION_KEY_PREFIX.to_string(),
            apply_on_register: true,
            drop_on_remove: true,
            force_reapply: false,
        }
    }

    /// Set the version key prefix
    pub fn version_key_prefix(mut self, prefix: &str) -> Self {
        self.version_key_prefix = prefix.to_string();
        self
    }

    /// Set whether registration after ready runs a migration pass
    pub fn apply_on_register(mut self, enabled: bool) -> Self {
        self.apply_on_register = enabled;
        self
    }

    /// Set whether removal after ready drops the resource's storage
    pub fn drop_on_remove(mut self, enabled: bool) -> Self {
        self.drop_on_remove = enabled;
        self
    }

    /// Set whether `up` applies every resource, pending or not
    pub fn force_reapply(mut self, enabled: bool) -> Self {
        self.force_reapply = enabled;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.version_key_prefix.is_empty() {
            return Err(SchemaError::InvalidConfig(
                "version_key_prefix cannot be empty".to_string(),
            ));
        }

        if self.version_key_prefix.chars().any(char::is_whitespace) {
            return Err(SchemaError::InvalidConfig(format!(
                "version_key_prefix '{}' contains whitespace",
                self.version_key_prefix
            )));
        }

        Ok(())
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self::new()
    }
}
