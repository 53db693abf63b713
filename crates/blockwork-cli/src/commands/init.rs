//! Init command: scaffold a starter homepage block.

use std::path::Path;

use blockwork_core::BlockName;

use super::scaffold::BlockTemplate;
use crate::theme::Theme;

const HOMEPAGE: &str = "homepage";

/// Create `<blocks_folder>/homepage` unless it already exists.
pub(crate) fn run_init(working_dir: &Path, blocks_folder: &str) -> anyhow::Result<()> {
    let blocks_dir = working_dir.join(blocks_folder);
    if blocks_dir.join(HOMEPAGE).exists() {
        println!(
            "{}",
            Theme::info(&format!("Project already initialized at {}", blocks_dir.display()))
        );
        return Ok(());
    }

    let name = BlockName::new(HOMEPAGE)?;
    let dir = BlockTemplate {
        name: &name,
        title: "Welcome",
        with_router: true,
    }
    .write(&blocks_dir)?;

    println!("{}", Theme::success("Initialized blockwork project"));
    println!("  Block:   {}", dir.display());
    println!(
        "  {}",
        Theme::dimmed("Next: run `blockwork setup` to register it")
    );
    Ok(())
}
