//! Configuration types deserialized from the merged layers.

use serde::{Deserialize, Serialize};

/// Complete blockwork configuration after layering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Block discovery and composition.
    pub blocks: BlocksSection,
    /// Log output.
    pub logging: LoggingSection,
}

/// `[blocks]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksSection {
    /// Blocks folder relative to the working directory.
    pub folder: String,
    /// Install new block requirements during setup.
    pub allow_installs: bool,
    /// Hash-check block directories at activation.
    pub verify_blocks: bool,
    /// Skip failing blocks instead of aborting.
    pub allow_import_failure: bool,
    /// Ask for a restart when setup changed something that needs one.
    pub restart_on_install: bool,
    /// Installer command line; the requirement is appended.
    pub install_command: Vec<String>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Base level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Output format: `pretty`, `compact`, or `json`.
    pub format: String,
    /// Extra `target=level` filter directives.
    pub directives: Vec<String>,
}
