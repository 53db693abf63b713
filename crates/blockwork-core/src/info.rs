//! The persisted per-block record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::manifest::DEFAULT_LOAD_ORDER;

/// Dense, manifest-derived record stored under `blocks.<name>` in the
/// registry document.
///
/// Only fields with a value are present. Keys are the snake_case manifest
/// field names plus `block_path` and `module`; extension fields are kept
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockInfo(toml::Table);

impl BlockInfo {
    /// Wrap a raw table.
    #[must_use]
    pub fn from_table(table: toml::Table) -> Self {
        Self(table)
    }

    /// The underlying table.
    #[must_use]
    pub fn as_table(&self) -> &toml::Table {
        &self.0
    }

    /// Consume into the underlying table.
    #[must_use]
    pub fn into_table(self) -> toml::Table {
        self.0
    }

    /// Raw field lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.0.get(key)
    }

    /// Whether the record has a field.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(toml::Value::as_str)
    }

    fn list_field(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .and_then(toml::Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Block name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// Module reference of the block directory.
    #[must_use]
    pub fn module(&self) -> Option<&str> {
        self.str_field("module")
    }

    /// Absolute block directory.
    #[must_use]
    pub fn block_path(&self) -> Option<PathBuf> {
        self.str_field("block_path").map(PathBuf::from)
    }

    /// Activation order; lower loads earlier.
    #[must_use]
    pub fn load_order(&self) -> i64 {
        self.0
            .get("load_order")
            .and_then(toml::Value::as_integer)
            .unwrap_or(DEFAULT_LOAD_ORDER)
    }

    /// Absolute static asset directory.
    #[must_use]
    pub fn statics(&self) -> Option<PathBuf> {
        self.str_field("statics").map(PathBuf::from)
    }

    /// Absolute template directory.
    #[must_use]
    pub fn templates_dir(&self) -> Option<PathBuf> {
        self.str_field("templates_dir").map(PathBuf::from)
    }

    /// Module reference of the template router.
    #[must_use]
    pub fn template_router(&self) -> Option<&str> {
        self.str_field("template_router")
    }

    /// Module reference of the API router.
    #[must_use]
    pub fn api_router(&self) -> Option<&str> {
        self.str_field("api_router")
    }

    /// Module reference of the schema extension.
    #[must_use]
    pub fn extra_settings(&self) -> Option<&str> {
        self.str_field("extra_settings")
    }

    /// External package requirements.
    #[must_use]
    pub fn requirements(&self) -> Vec<String> {
        self.list_field("requirements")
    }

    /// Names of blocks this block depends on.
    #[must_use]
    pub fn dependencies(&self) -> Vec<String> {
        self.list_field("dependencies")
    }

    /// Insert every field of `newer` whose key is absent here.
    ///
    /// Existing values are never overwritten. Returns the keys that were added.
    pub fn merge_missing(&mut self, newer: &BlockInfo) -> Vec<String> {
        let mut added = Vec::new();
        for (key, value) in &newer.0 {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
                added.push(key.clone());
            }
        }
        added
    }
}

impl From<toml::Table> for BlockInfo {
    fn from(table: toml::Table) -> Self {
        Self(table)
    }
}
