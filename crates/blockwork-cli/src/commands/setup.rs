//! Setup command: discover blocks and update the registry.

use std::path::Path;

use blockwork_config::Config;
use blockwork_registry::{BlockManager, BlockModules, SetupReport};

use crate::config_bridge::{self, SetupOverrides};
use crate::theme::Theme;

/// Run `setup` for `working_dir` and print a summary.
pub(crate) fn run_setup(
    working_dir: &Path,
    cfg: &Config,
    overrides: &SetupOverrides,
) -> anyhow::Result<SetupReport> {
    let options = config_bridge::manager_options(cfg, overrides);
    println!(
        "{}",
        Theme::header(&format!("Setting up blocks in {}", options.blocks_folder))
    );

    let mut manager = BlockManager::new(working_dir, options, BlockModules::default())
        .with_installer(config_bridge::installer(cfg));
    let report = manager.setup()?;

    for name in &report.resolved {
        println!("  {}", Theme::kv("resolved", name));
    }
    for dir in &report.skipped {
        println!("  {}", Theme::warning(&format!("skipped {dir}")));
    }
    for requirement in &report.new_installs {
        println!("  {}", Theme::kv("installed", requirement));
    }
    for requirement in &report.pending_installs {
        println!(
            "  {}",
            Theme::warning(&format!("{requirement} not installed (re-run with --auto-install)"))
        );
    }

    println!("{}", Theme::success("Block setup complete"));
    if report.requires_restart && cfg.blocks.restart_on_install {
        println!(
            "{}",
            Theme::warning("Restart the application for new blocks and requirements to take effect")
        );
    }
    println!(
        "{}",
        Theme::dimmed(&format!(
            "Registry: {}",
            manager.store().registry_path().display()
        ))
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::verify::{Toggle, run_verify};
    use blockwork_registry::RegistryStore;

    #[test]
    fn plain_setup_keeps_verification_enabled() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("blocks")).unwrap();
        let cfg = blockwork_config::defaults().unwrap();

        run_verify(tmp.path(), Toggle::On).unwrap();
        run_setup(tmp.path(), &cfg, &SetupOverrides::default()).unwrap();

        let state = RegistryStore::new(tmp.path()).load().unwrap();
        assert!(state.settings.verify_blocks);
    }

    #[test]
    fn verify_flag_enables_verification() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("blocks")).unwrap();
        let cfg = blockwork_config::defaults().unwrap();
        let overrides = SetupOverrides {
            verify_blocks: true,
            ..SetupOverrides::default()
        };

        run_setup(tmp.path(), &cfg, &overrides).unwrap();
        assert!(RegistryStore::new(tmp.path()).load().unwrap().settings.verify_blocks);
    }
}
