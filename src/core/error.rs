use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Resource '{0}' not found")]
    NotFound(String),

    #[error("Failed to create or upgrade '{resource}': {reason}")]
    ResourceApply { resource: String, reason: String },

    #[error("Failed to drop '{resource}': {reason}")]
    ResourceDrop { resource: String, reason: String },

    #[error("Invalid schema version: '{0}'")]
    InvalidVersion(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/0 error: {0}")]
    IoError(String),
}

impl SchemaError {
    /// Shorthand for resources reporting a failed create/upgrade.
    pub fn apply(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceApply {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for resources reporting a failed drop.
    pub fn drop_failed(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceDrop {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;


impl<T> From<std::sync::PoisonError<T>> for SchemaError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
