//! Block directory discovery.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{BlockError, BlockResult};
use crate::manifest::MANIFEST_FILE_NAME;

/// List the block directories under `blocks_folder`.
///
/// A block directory is an immediate subdirectory containing a
/// `block_config.toml`. Results are sorted by path so discovery order does
/// not depend on the filesystem.
///
/// # Errors
///
/// Returns [`BlockError::BlocksFolderMissing`] if the folder does not exist,
/// or [`BlockError::Io`] if it cannot be read.
pub fn discover_block_dirs(blocks_folder: &Path) -> BlockResult<Vec<PathBuf>> {
    if !blocks_folder.is_dir() {
        return Err(BlockError::BlocksFolderMissing {
            path: blocks_folder.to_path_buf(),
        });
    }

    let entries =
        std::fs::read_dir(blocks_folder).map_err(|e| BlockError::io(blocks_folder, e))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BlockError::io(blocks_folder, e))?.path();
        if !path.is_dir() {
            continue;
        }
        if path.join(MANIFEST_FILE_NAME).is_file() {
            dirs.push(path);
        } else {
            debug!(path = %path.display(), "Skipping directory without a block manifest");
        }
    }
    dirs.sort();

    info!(
        path = %blocks_folder.display(),
        count = dirs.len(),
        "Discovered block directories"
    );
    Ok(dirs)
}
