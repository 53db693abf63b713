//! The registry document.

use std::path::PathBuf;

use blockwork_core::BlockInfo;
use blockwork_hooks::HookTable;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default blocks folder, relative to the working directory.
pub const DEFAULT_BLOCKS_FOLDER: &str = "blocks";

fn default_blocks_folder() -> String {
    DEFAULT_BLOCKS_FOLDER.to_string()
}

/// Process-level settings persisted with the registry so that a later
/// `activate` uses the values chosen at `setup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySettings {
    /// Whether new requirements are installed.
    #[serde(default)]
    pub allow_installs: bool,
    /// Blocks folder relative to the working directory.
    #[serde(default = "default_blocks_folder")]
    pub blocks_folder: String,
    /// Whether block directories are hash-checked at activation.
    #[serde(default)]
    pub verify_blocks: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            allow_installs: false,
            blocks_folder: default_blocks_folder(),
            verify_blocks: false,
        }
    }
}

/// The persisted, reconciled registry.
///
/// Every collection defaults to empty so documents written by older versions
/// load cleanly. Collections only grow during `setup`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryState {
    /// Requirements already processed.
    #[serde(default)]
    pub installs: Vec<String>,
    /// Settings modules contributing schema extensions.
    #[serde(default)]
    pub extra_settings: Vec<String>,
    /// Template search roots contributed by blocks.
    #[serde(default)]
    pub templates_dir: Vec<PathBuf>,
    /// Persisted process settings.
    #[serde(default)]
    pub settings: RegistrySettings,
    /// Hook references per lifecycle phase.
    #[serde(default)]
    pub hooks: HookTable,
    /// Block records by name, in discovery order.
    #[serde(default)]
    pub blocks: IndexMap<String, BlockInfo>,
}

impl RegistryState {
    /// Block names in ascending load order; ties keep discovery order.
    #[must_use]
    pub fn load_sequence(&self) -> Vec<(&str, &BlockInfo)> {
        let mut blocks: Vec<_> = self
            .blocks
            .iter()
            .map(|(name, info)| (name.as_str(), info))
            .collect();
        blocks.sort_by_key(|(_, info)| info.load_order());
        blocks
    }
}
