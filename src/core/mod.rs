pub mod error;
pub mod version;

pub use error::{Result, SchemaError};
pub use version::SchemaVersion;
