//! Composition driver.
//!
//! [`BlockManager`] owns the registry for one working directory and moves
//! through `Uninitialized -> Loaded -> Resolved -> Activated`:
//!
//! - [`BlockManager::load`] reads the persisted registry
//! - [`BlockManager::setup`] scans the blocks folder, resolves every block,
//!   and persists the result
//! - [`BlockManager::activate`] mounts the registered blocks into a host
//!
//! Activation happens at most once per manager.

use std::path::{Path, PathBuf};

use blockwork_core::{
    BlockError, BlockInfo, BlockManifest, BlockResult, ExtensionCatalog, build_schema,
    discover_block_dirs,
};
use blockwork_hooks::{HookCatalog, HookContext, HookPhase, ResolvedHook, run};
use indexmap::IndexMap;
use tracing::{debug, error, info, info_span, warn};

use crate::host::{API_ROUTER_PREFIX, HostApp, RouterCatalog, TEMPLATE_ROUTER_PREFIX, TemplateEnvironment};
use crate::installer::{CommandInstaller, PackageInstaller};
use crate::integrity::{HashRecord, IntegrityVerifier};
use crate::resolver::resolve_block;
use crate::state::{DEFAULT_BLOCKS_FOLDER, RegistrySettings, RegistryState};
use crate::store::RegistryStore;

/// Lifecycle stage of a [`BlockManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerStage {
    /// Nothing loaded.
    Uninitialized,
    /// Registry loaded from disk.
    Loaded,
    /// `setup` completed.
    Resolved,
    /// Blocks mounted into a host.
    Activated,
}

/// Options chosen by the caller for `setup` and `activate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Blocks folder relative to the working directory.
    pub blocks_folder: String,
    /// Install new requirements during `setup`.
    pub allow_installs: bool,
    /// Hash-check blocks during `activate`. `None` keeps the persisted choice.
    pub verify_blocks: Option<bool>,
    /// Skip blocks that fail to parse or mount instead of aborting.
    pub allow_import_failure: bool,
    /// Record a digest for every discovered block during `setup`.
    pub save_hashes: bool,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            blocks_folder: DEFAULT_BLOCKS_FOLDER.to_string(),
            allow_installs: false,
            verify_blocks: None,
            allow_import_failure: false,
            save_hashes: false,
        }
    }
}

impl ManagerOptions {
    fn apply_to(&self, settings: &mut RegistrySettings) {
        settings.allow_installs = self.allow_installs;
        settings.blocks_folder.clone_from(&self.blocks_folder);
        if let Some(verify) = self.verify_blocks {
            settings.verify_blocks = verify;
        }
    }
}

/// Host-provided code for blocks: schema extensions, hooks, and routers.
#[derive(Debug, Clone, Default)]
pub struct BlockModules {
    /// Schema extensions by settings module.
    pub extensions: ExtensionCatalog,
    /// Hook callables by module and function.
    pub hooks: HookCatalog,
    /// Route groups by router module.
    pub routers: RouterCatalog,
}

/// Outcome of [`BlockManager::setup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// New installs, extensions, template roots, or hooks need a restart.
    pub requires_restart: bool,
    /// Blocks resolved, in resolution order.
    pub resolved: Vec<String>,
    /// Block directories skipped because of tolerated errors.
    pub skipped: Vec<String>,
    /// Requirements installed.
    pub new_installs: Vec<String>,
    /// Requirements left uninstalled because installs are disabled.
    pub pending_installs: Vec<String>,
}

/// Outcome of [`BlockManager::activate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Blocks mounted, in load order.
    pub mounted: Vec<String>,
    /// Blocks skipped because of tolerated errors.
    pub failed: Vec<String>,
}

/// Discovers, resolves, and mounts blocks for one working directory.
pub struct BlockManager {
    working_dir: PathBuf,
    options: ManagerOptions,
    store: RegistryStore,
    modules: BlockModules,
    installer: Box<dyn PackageInstaller>,
    state: Option<RegistryState>,
    templates: Option<TemplateEnvironment>,
    stage: ManagerStage,
}

impl std::fmt::Debug for BlockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockManager")
            .field("working_dir", &self.working_dir)
            .field("options", &self.options)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl BlockManager {
    /// A manager for `working_dir` using the `pip install` installer.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>, options: ManagerOptions, modules: BlockModules) -> Self {
        let working_dir = working_dir.into();
        Self {
            store: RegistryStore::new(&working_dir),
            working_dir,
            options,
            modules,
            installer: Box::new(CommandInstaller::default()),
            state: None,
            templates: None,
            stage: ManagerStage::Uninitialized,
        }
    }

    /// Replace the package installer.
    #[must_use]
    pub fn with_installer(mut self, installer: impl PackageInstaller + 'static) -> Self {
        self.installer = Box::new(installer);
        self
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn stage(&self) -> ManagerStage {
        self.stage
    }

    /// The working directory.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The registry store.
    #[must_use]
    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    /// The in-memory registry, once loaded or set up.
    #[must_use]
    pub fn state(&self) -> Option<&RegistryState> {
        self.state.as_ref()
    }

    /// The template environment, once activated.
    #[must_use]
    pub fn templates(&self) -> Option<&TemplateEnvironment> {
        self.templates.as_ref()
    }

    /// Registered record of a block.
    #[must_use]
    pub fn block_info(&self, name: &str) -> Option<&BlockInfo> {
        self.state.as_ref()?.blocks.get(name)
    }

    /// Module reference of a registered block.
    #[must_use]
    pub fn block_module(&self, name: &str) -> Option<&str> {
        self.block_info(name)?.module()
    }

    /// Read the persisted registry.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::ConfigurationMissing`] if `setup` never ran here.
    pub fn load(&mut self) -> BlockResult<&RegistryState> {
        if self.stage == ManagerStage::Activated {
            return Err(BlockError::AlreadyActivated);
        }
        let state = self.store.load().inspect_err(|e| {
            error!(path = %self.store.registry_path().display(), error = %e, "Failed to load block registry");
        })?;
        self.stage = ManagerStage::Loaded;
        Ok(&*self.state.insert(state))
    }

    /// Discover and resolve every block, then persist the registry.
    ///
    /// Manifests that fail to parse are skipped when `allow_import_failure`
    /// is set; missing dependencies and install failures always abort. The
    /// registry is saved after each resolved block, so progress survives a
    /// later fatal error.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error.
    pub fn setup(&mut self) -> BlockResult<SetupReport> {
        if self.stage == ManagerStage::Activated {
            return Err(BlockError::AlreadyActivated);
        }
        let span = info_span!("setup", working_dir = %self.working_dir.display());
        let _enter = span.enter();

        let mut state = match self.state.take() {
            Some(state) => state,
            None => self.store.load_or_default()?,
        };
        self.options.apply_to(&mut state.settings);

        let result = self.setup_blocks(&mut state);
        self.state = Some(state);
        let report = result?;

        if let Some(state) = &self.state {
            let hooks = state.hooks.resolve(HookPhase::Setup, &self.modules.hooks);
            run_phase(&hooks, HookPhase::Setup, None, &state.blocks, &span);
        }

        self.stage = ManagerStage::Resolved;
        info!(
            resolved = report.resolved.len(),
            skipped = report.skipped.len(),
            requires_restart = report.requires_restart,
            "Block setup complete"
        );
        Ok(report)
    }

    fn setup_blocks(&self, state: &mut RegistryState) -> BlockResult<SetupReport> {
        let mut report = SetupReport::default();
        let schema = build_schema(&state.extra_settings, &self.modules.extensions);
        let folder = self.working_dir.join(&self.options.blocks_folder);
        let dirs = discover_block_dirs(&folder).inspect_err(|e| {
            error!(path = %folder.display(), error = %e, "Cannot scan blocks folder");
        })?;

        let mut manifests: Vec<BlockManifest> = Vec::with_capacity(dirs.len());
        for dir in &dirs {
            let parsed = BlockManifest::load(dir, &self.working_dir, &schema).and_then(|m| {
                if manifests.iter().any(|seen| seen.name == m.name) {
                    Err(BlockError::Validation {
                        block: m.name.to_string(),
                        message: format!("duplicate block name in {}", dir.display()),
                    })
                } else {
                    Ok(m)
                }
            });
            match parsed {
                Ok(m) => manifests.push(m),
                Err(e) => {
                    self.tolerate(e, &dir.display().to_string())?;
                    report.skipped.push(dir.display().to_string());
                },
            }
        }
        // Registered blocks keep their stored order, matching activation.
        manifests.sort_by_key(|m| {
            state
                .blocks
                .get(m.name.as_str())
                .map_or(m.load_order, BlockInfo::load_order)
        });

        for manifest in &manifests {
            let name = manifest.name.to_string();
            match resolve_block(manifest, state, self.installer.as_ref(), &self.working_dir) {
                Ok(res) => {
                    report.requires_restart |= res.requires_restart;
                    report.new_installs.extend(res.new_installs);
                    report.pending_installs.extend(res.pending_installs);
                    report.resolved.push(name);
                    self.store.save(state)?;
                },
                Err(e) => {
                    self.tolerate(e, &name)?;
                    report.skipped.push(name);
                },
            }
        }

        self.store.save(state)?;
        if self.options.save_hashes {
            let path = self.store.hash_path();
            let mut existing = HashRecord::load_or_default(&path)?;
            for manifest in &manifests {
                if report.resolved.iter().any(|n| n == manifest.name.as_str()) {
                    existing.record(&manifest.block_path)?;
                }
            }
            existing.save(&path)?;
            info!(blocks = existing.len(), "Recorded block hashes");
        }
        Ok(report)
    }

    /// Log `err` and decide whether the run continues.
    fn tolerate(&self, err: BlockError, block: &str) -> BlockResult<()> {
        error!(block, error = %err, "Block failed");
        if err.is_always_fatal() || !self.options.allow_import_failure {
            return Err(err);
        }
        warn!(block, "Continuing without block");
        Ok(())
    }

    /// Mount every registered block into `host`, in ascending load order.
    ///
    /// Loads the persisted registry if `setup` has not run in this process.
    ///
    /// # Errors
    ///
    /// - [`BlockError::AlreadyActivated`] on a second call
    /// - [`BlockError::ConfigurationMissing`] if no registry exists
    /// - [`BlockError::IntegrityMismatch`] if a verified block changed
    /// - the first per-block error unless `allow_import_failure` is set
    pub fn activate(&mut self, host: &mut dyn HostApp) -> BlockResult<ActivationReport> {
        if self.stage == ManagerStage::Activated {
            return Err(BlockError::AlreadyActivated);
        }
        if self.state.is_none() {
            self.load()?;
        }
        let Some(state) = self.state.as_ref() else {
            return Err(BlockError::ConfigurationMissing {
                path: self.store.registry_path(),
            });
        };

        let span = info_span!("activate", working_dir = %self.working_dir.display());
        let _enter = span.enter();

        let start = state.hooks.resolve(HookPhase::Start, &self.modules.hooks);
        let preload = state.hooks.resolve(HookPhase::BlockPreload, &self.modules.hooks);
        let postload = state.hooks.resolve(HookPhase::BlockPostload, &self.modules.hooks);
        run_phase(&start, HookPhase::Start, None, &state.blocks, &span);

        let templates = TemplateEnvironment::from_dirs(&state.templates_dir);
        debug!(roots = templates.roots().len(), "Built template environment");

        let verifier = if state.settings.verify_blocks {
            IntegrityVerifier::new(true, HashRecord::load_or_default(&self.store.hash_path())?)
        } else {
            IntegrityVerifier::default()
        };

        let mut report = ActivationReport::default();
        for (name, info) in state.load_sequence() {
            info!(block = name, "Prepping block");
            let mounted = self.mount_block(name, info, host, &verifier, &preload, &postload, &state.blocks, &span);
            match mounted {
                Ok(()) => report.mounted.push(name.to_string()),
                Err(e) => {
                    self.tolerate(e, name)?;
                    report.failed.push(name.to_string());
                },
            }
        }

        self.templates = Some(templates);
        self.stage = ManagerStage::Activated;
        info!(mounted = report.mounted.len(), failed = report.failed.len(), "Blocks activated");
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn mount_block(
        &self,
        name: &str,
        info: &BlockInfo,
        host: &mut dyn HostApp,
        verifier: &IntegrityVerifier,
        preload: &[ResolvedHook],
        postload: &[ResolvedHook],
        blocks: &IndexMap<String, BlockInfo>,
        span: &tracing::Span,
    ) -> BlockResult<()> {
        if let Some(path) = info.block_path() {
            verifier.ensure(&path)?;
        }

        run_phase(preload, HookPhase::BlockPreload, Some(info), blocks, span);

        if let Some(statics) = info.statics()
            && statics.is_dir()
        {
            host.mount_static_directory(&format!("/{name}/static"), &statics, &format!("{name}-static"));
            info!(block = name, path = %statics.display(), "Mounted statics");
        }

        for (module, prefix) in [
            (info.template_router(), TEMPLATE_ROUTER_PREFIX),
            (info.api_router(), API_ROUTER_PREFIX),
        ] {
            let Some(module) = module else { continue };
            let group = self.modules.routers.build(module).ok_or_else(|| BlockError::ImportFailure {
                block: name.to_string(),
                module: module.to_string(),
                message: "no router registered for module".into(),
            })?;
            if host.has_route_group(&group.name) {
                debug!(block = name, router = %group.name, "Router already mounted");
                continue;
            }
            info!(block = name, module, prefix, "Mounted router");
            host.mount_route_group(prefix, group);
        }

        run_phase(postload, HookPhase::BlockPostload, Some(info), blocks, span);
        Ok(())
    }
}

fn run_phase(
    hooks: &[ResolvedHook],
    phase: HookPhase,
    block: Option<&BlockInfo>,
    blocks: &IndexMap<String, BlockInfo>,
    span: &tracing::Span,
) {
    if hooks.is_empty() {
        return;
    }
    let ctx = HookContext {
        phase,
        block,
        blocks,
        span,
    };
    run(hooks, &ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RouteGroup;

    #[derive(Default)]
    struct NullHost {
        groups: Vec<String>,
    }

    impl HostApp for NullHost {
        fn has_route_group(&self, name: &str) -> bool {
            self.groups.iter().any(|g| g == name)
        }

        fn mount_route_group(&mut self, _prefix: &str, group: RouteGroup) {
            self.groups.push(group.name);
        }

        fn mount_static_directory(&mut self, _url_prefix: &str, _path: &Path, _name: &str) {}
    }

    #[test]
    fn activate_without_registry_is_configuration_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut manager = BlockManager::new(tmp.path(), ManagerOptions::default(), BlockModules::default());
        let err = manager.activate(&mut NullHost::default()).unwrap_err();
        assert!(matches!(err, BlockError::ConfigurationMissing { .. }));
        assert_eq!(manager.stage(), ManagerStage::Uninitialized);
    }

    #[test]
    fn setup_without_blocks_folder_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut manager = BlockManager::new(tmp.path(), ManagerOptions::default(), BlockModules::default());
        let err = manager.setup().unwrap_err();
        assert!(matches!(err, BlockError::BlocksFolderMissing { .. }));
    }

    #[test]
    fn activation_is_not_reentrant() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("blocks")).unwrap();
        let mut manager = BlockManager::new(tmp.path(), ManagerOptions::default(), BlockModules::default());

        manager.setup().unwrap();
        assert_eq!(manager.stage(), ManagerStage::Resolved);
        let mut host = NullHost::default();
        manager.activate(&mut host).unwrap();
        assert_eq!(manager.stage(), ManagerStage::Activated);

        assert!(matches!(manager.activate(&mut host), Err(BlockError::AlreadyActivated)));
        assert!(matches!(manager.setup(), Err(BlockError::AlreadyActivated)));
    }

    #[test]
    fn settings_are_persisted_by_setup() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("blocks")).unwrap();
        let options = ManagerOptions {
            verify_blocks: Some(true),
            ..ManagerOptions::default()
        };
        BlockManager::new(tmp.path(), options, BlockModules::default())
            .setup()
            .unwrap();

        let mut later = BlockManager::new(tmp.path(), ManagerOptions::default(), BlockModules::default());
        assert!(later.load().unwrap().settings.verify_blocks);
    }

    #[test]
    fn setup_keeps_persisted_verification_when_unset() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("blocks")).unwrap();
        let store = RegistryStore::new(tmp.path());
        store
            .update(|s| {
                s.settings.verify_blocks = true;
                Ok(())
            })
            .unwrap();

        BlockManager::new(tmp.path(), ManagerOptions::default(), BlockModules::default())
            .setup()
            .unwrap();
        assert!(store.load().unwrap().settings.verify_blocks);

        let off = ManagerOptions {
            verify_blocks: Some(false),
            ..ManagerOptions::default()
        };
        BlockManager::new(tmp.path(), off, BlockModules::default())
            .setup()
            .unwrap();
        assert!(!store.load().unwrap().settings.verify_blocks);
    }

    #[test]
    fn resetup_orders_registered_blocks_by_stored_load_order() {
        let tmp = tempfile::tempdir().unwrap();
        let write = |dir: &str, manifest: &str| {
            let block = tmp.path().join("blocks").join(dir);
            std::fs::create_dir_all(&block).unwrap();
            std::fs::write(block.join(blockwork_core::MANIFEST_FILE_NAME), manifest).unwrap();
        };
        write("blog", "name = \"blog\"\nversion = 1\nload_order = 1");
        write("shop", "name = \"shop\"\nversion = 1\nload_order = 5");

        let first = BlockManager::new(tmp.path(), ManagerOptions::default(), BlockModules::default())
            .setup()
            .unwrap();
        assert_eq!(first.resolved, ["blog", "shop"]);

        write("blog", "name = \"blog\"\nversion = 1\nload_order = 9");
        let mut manager = BlockManager::new(tmp.path(), ManagerOptions::default(), BlockModules::default());
        let second = manager.setup().unwrap();
        assert_eq!(second.resolved, ["blog", "shop"]);
        assert_eq!(manager.block_info("blog").unwrap().load_order(), 1);
    }
}
