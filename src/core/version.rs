use super::{Result, SchemaError};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref VERSION_PATTERN: Regex =
        Regex::new(r"^\s*(\d+)(?:\.(\d+))?(?:\.(\d+))?\s*$").unwrap();
}

/// Version of a schema resource.
///
/// Ordering compares `major`, then `minor`, then `patch`, so `1.1` sorts
/// after `1.0.9`. Short forms are accepted when parsing: `"2"` is `2.0.0`
/// and `"1.1"` is `1.1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let caps = VERSION_PATTERN
            .captures(input)
            .ok_or_else(|| SchemaError::InvalidVersion(input.to_string()))?;

        let segment = |idx: usize| -> Result<u32> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| SchemaError::InvalidVersion(input.to_string())),
                None => Ok(0),
            }
        };

        Ok(Self {
            major: segment(1)?,
            minor: segment(2)?,
            patch: segment(3)?,
        })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for SchemaVersion {
    type Error = SchemaError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SchemaVersion> for String {
    fn from(version: SchemaVersion) -> Self {
        version.to_string()
    }
}
