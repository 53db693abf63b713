//! Verify command: toggle activation-time integrity checks.

use std::path::Path;

use blockwork_registry::RegistryStore;
use clap::ValueEnum;
use tracing::info;

use crate::theme::Theme;

/// `on` or `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Toggle {
    On,
    Off,
}

/// Persist `settings.verifyBlocks` in the registry document.
pub(crate) fn run_verify(working_dir: &Path, toggle: Toggle) -> anyhow::Result<()> {
    let enabled = toggle == Toggle::On;
    let store = RegistryStore::new(working_dir);
    store.update(|state| {
        state.settings.verify_blocks = enabled;
        Ok(())
    })?;
    info!(enabled, path = %store.registry_path().display(), "Updated block verification");

    let msg = if enabled {
        "Block verification enabled"
    } else {
        "Block verification disabled"
    };
    println!("{}", Theme::success(msg));
    Ok(())
}
