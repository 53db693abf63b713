//! Loading and saving the registry document.
//!
//! The registry lives in `<working_dir>/blockmanager/block_infos.toml` and is
//! always read and written whole. Writes go through a temp file and rename so
//! an interrupted `setup` never leaves a truncated document.

use std::path::{Path, PathBuf};

use blockwork_core::{BlockError, BlockResult};
use tracing::debug;

use crate::fs::atomic_write;
use crate::state::RegistryState;

/// State directory under the working directory.
pub const STATE_DIR: &str = "blockmanager";
/// Registry document file name.
pub const REGISTRY_FILE: &str = "block_infos.toml";
/// Hash record file name.
pub const HASH_FILE: &str = "block_hashes.json";

const HEADER: &str = "# Generated by blockwork. Do not edit manually.\n\n";

/// Location of the persisted registry for one working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStore {
    state_dir: PathBuf,
}

impl RegistryStore {
    /// Store rooted at `<working_dir>/blockmanager`.
    #[must_use]
    pub fn new(working_dir: &Path) -> Self {
        Self {
            state_dir: working_dir.join(STATE_DIR),
        }
    }

    /// The state directory.
    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Path of the registry document.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.state_dir.join(REGISTRY_FILE)
    }

    /// Path of the hash record.
    #[must_use]
    pub fn hash_path(&self) -> PathBuf {
        self.state_dir.join(HASH_FILE)
    }

    /// Whether a registry document exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.registry_path().is_file()
    }

    /// Load the registry document.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::ConfigurationMissing`] if no document exists, or
    /// [`BlockError::Parse`] if it is not a valid registry.
    pub fn load(&self) -> BlockResult<RegistryState> {
        let path = self.registry_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse_content(&path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlockError::ConfigurationMissing { path })
            },
            Err(e) => Err(BlockError::io(&path, e)),
        }
    }

    /// Load the registry document, or an empty registry if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the document exists but cannot be read or parsed.
    pub fn load_or_default(&self) -> BlockResult<RegistryState> {
        match self.load() {
            Err(BlockError::ConfigurationMissing { .. }) => Ok(RegistryState::default()),
            other => other,
        }
    }

    fn parse_content(path: &Path, content: &str) -> BlockResult<RegistryState> {
        toml::from_str(content).map_err(|e| BlockError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Replace the registry document with `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    pub fn save(&self, state: &RegistryState) -> BlockResult<()> {
        let path = self.registry_path();
        let body = toml::to_string_pretty(state).map_err(|e| BlockError::Serialize {
            path: path.clone(),
            message: e.to_string(),
        })?;
        atomic_write(&path, &format!("{HEADER}{body}"))?;
        debug!(path = %path.display(), blocks = state.blocks.len(), "Saved block registry");
        Ok(())
    }

    /// Load (or start empty), apply `f`, and save.
    ///
    /// # Errors
    ///
    /// Returns an error from loading, from `f`, or from saving.
    pub fn update<F>(&self, f: F) -> BlockResult<RegistryState>
    where
        F: FnOnce(&mut RegistryState) -> BlockResult<()>,
    {
        let mut state = self.load_or_default()?;
        f(&mut state)?;
        self.save(&state)?;
        Ok(state)
    }
}
