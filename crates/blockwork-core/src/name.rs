//! Block names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BlockError, BlockResult};

/// Minimum length of a block name.
pub const MIN_NAME_LEN: usize = 3;
/// Maximum length of a block name.
pub const MAX_NAME_LEN: usize = 32;

/// Unique block identifier.
///
/// Block names are 3 to 32 ASCII alphanumeric characters or underscores,
/// e.g. `"homepage"` or `"blog_comments"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BlockName(String);

/// Deserialize with validation so crafted registry documents cannot smuggle
/// names that would not pass manifest parsing.
impl<'de> Deserialize<'de> for BlockName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl BlockName {
    /// Create a new `BlockName`, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::Validation`] if the name is too short, too long,
    /// or contains characters other than ASCII alphanumerics and `_`.
    pub fn new(name: impl Into<String>) -> BlockResult<Self> {
        let name = name.into();
        if let Some(message) = Self::problem(&name) {
            return Err(BlockError::Validation {
                block: name,
                message,
            });
        }
        Ok(Self(name))
    }

    /// Check whether a string is a valid block name.
    #[must_use]
    pub fn is_valid(name: &str) -> bool {
        Self::problem(name).is_none()
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn problem(name: &str) -> Option<String> {
        let len = name.chars().count();
        if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
            return Some(format!(
                "block name must be {MIN_NAME_LEN}-{MAX_NAME_LEN} characters, got {len}"
            ));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Some(format!(
                "block name must contain only alphanumeric characters and underscores, got: {name}"
            ));
        }
        None
    }
}

impl fmt::Display for BlockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlockName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
