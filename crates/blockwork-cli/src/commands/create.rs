//! Create command: scaffold a new block.

use std::path::Path;

use anyhow::Context;
use blockwork_core::BlockName;

use super::scaffold::BlockTemplate;
use crate::theme::Theme;

/// Scaffold `<blocks_folder>/<name>`.
pub(crate) fn run_create(working_dir: &Path, blocks_folder: &str, name: &str) -> anyhow::Result<()> {
    let name = BlockName::new(name).with_context(|| {
        format!("'{name}' is not a valid block name (3-32 letters, digits, or underscores)")
    })?;
    let blocks_dir = working_dir.join(blocks_folder);
    let dir = BlockTemplate {
        name: &name,
        title: name.as_str(),
        with_router: false,
    }
    .write(&blocks_dir)?;

    println!("{}", Theme::success(&format!("Created block {name}")));
    println!("  {}", Theme::kv("path", &dir.display().to_string()));
    Ok(())
}
