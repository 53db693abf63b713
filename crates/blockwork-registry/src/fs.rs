//! Atomic document writes.

use std::io::Write;
use std::path::Path;

use blockwork_core::{BlockError, BlockResult};

/// Replace `path` with `content` via a synced temp file in the same directory.
///
/// The parent directory is created if absent.
pub(crate) fn atomic_write(path: &Path, content: &str) -> BlockResult<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| BlockError::io(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| BlockError::io(parent, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| BlockError::io(tmp.path(), e))?;

    // Without a sync, a crash after rename can leave an empty document.
    tmp.as_file()
        .sync_all()
        .map_err(|e| BlockError::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| BlockError::io(path, e.error))?;
    Ok(())
}
