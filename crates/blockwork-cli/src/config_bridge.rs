//! Maps `blockwork-config` values onto the logging and registry types.

use blockwork_config::Config;
use blockwork_registry::{CommandInstaller, ManagerOptions};
use blockwork_telemetry::{LogConfig, LogFormat};

/// Flags given on the command line; `Some`/`true` overrides the config.
#[derive(Debug, Clone, Default)]
pub(crate) struct SetupOverrides {
    pub(crate) folder: Option<String>,
    pub(crate) auto_install: bool,
    pub(crate) save_hashes: bool,
    pub(crate) verify_blocks: bool,
}

pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg.logging.format.parse().unwrap_or(LogFormat::Compact);
    let mut lc = LogConfig::new(cfg.logging.level.clone()).with_format(format);
    for directive in &cfg.logging.directives {
        lc = lc.with_directive(directive.clone());
    }
    lc
}

pub(crate) fn manager_options(cfg: &Config, overrides: &SetupOverrides) -> ManagerOptions {
    ManagerOptions {
        blocks_folder: overrides
            .folder
            .clone()
            .unwrap_or_else(|| cfg.blocks.folder.clone()),
        allow_installs: overrides.auto_install || cfg.blocks.allow_installs,
        verify_blocks: (overrides.verify_blocks || cfg.blocks.verify_blocks).then_some(true),
        allow_import_failure: cfg.blocks.allow_import_failure,
        save_hashes: overrides.save_hashes,
    }
}

pub(crate) fn installer(cfg: &Config) -> CommandInstaller {
    CommandInstaller::new(cfg.blocks.install_command.clone())
}
