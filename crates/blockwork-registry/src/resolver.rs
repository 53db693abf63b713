//! Dependency and requirement resolution.
//!
//! Resolving a manifest merges it into the registry. The merge is additive:
//! a block that is already registered only gains fields it did not have, so
//! edits to existing fields in a manifest have no effect until the registry
//! is reset.

use std::path::Path;

use blockwork_core::{BlockError, BlockManifest, BlockResult};
use blockwork_hooks::{HookPhase, discover_hooks};
use tracing::{debug, error, info, warn};

use crate::installer::PackageInstaller;
use crate::state::RegistryState;

/// What resolving one block changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// A restart is needed for the changes to take effect.
    pub requires_restart: bool,
    /// Requirements installed during this resolution.
    pub new_installs: Vec<String>,
    /// Requirements seen for the first time but not installed.
    pub pending_installs: Vec<String>,
    /// Whether the block was registered for the first time.
    pub newly_registered: bool,
    /// Fields added to an existing record.
    pub added_fields: Vec<String>,
    /// Whether any hook reference was added.
    pub new_hooks: bool,
}

/// Merge a parsed manifest into the registry.
///
/// # Errors
///
/// - [`BlockError::MissingDependency`] if a declared dependency is not registered
/// - [`BlockError::InstallFailure`] if installing a new requirement fails
/// - [`BlockError::Validation`] if a hook declaration is malformed
pub fn resolve_block(
    manifest: &BlockManifest,
    state: &mut RegistryState,
    installer: &dyn PackageInstaller,
    project_root: &Path,
) -> BlockResult<Resolution> {
    let name = manifest.name.as_str();
    let mut res = Resolution::default();

    for dependency in &manifest.dependencies {
        if !state.blocks.contains_key(dependency) {
            error!(block = name, dependency = %dependency, "Dependency is not registered");
            return Err(BlockError::MissingDependency {
                block: name.to_string(),
                dependency: dependency.clone(),
            });
        }
    }

    let hooks = discover_hooks(manifest, project_root).map_err(|e| {
        error!(block = name, error = %e, "Invalid hook declaration");
        e.for_block(name)
    })?;

    let info = manifest.to_info();
    match state.blocks.get_mut(name) {
        Some(existing) => {
            res.added_fields = existing.merge_missing(&info);
            if !res.added_fields.is_empty() {
                debug!(block = name, fields = ?res.added_fields, "Added new fields to registered block");
            }
        },
        None => {
            info!(block = name, module = %manifest.module, "Registered block");
            state.blocks.insert(name.to_string(), info);
            res.newly_registered = true;
        },
    }

    if let Some(settings) = &manifest.extra_settings
        && !state.extra_settings.contains(settings)
    {
        info!(block = name, module = %settings, "New schema extension module");
        state.extra_settings.push(settings.clone());
        res.requires_restart = true;
    }

    if let Some(dir) = &manifest.templates_dir
        && !state.templates_dir.contains(dir)
    {
        info!(block = name, path = %dir.display(), "New template directory");
        state.templates_dir.push(dir.clone());
        res.requires_restart = true;
    }

    for requirement in &manifest.requirements {
        if state.installs.contains(requirement) {
            continue;
        }
        res.requires_restart = true;
        if state.settings.allow_installs {
            installer.install(requirement).inspect_err(|e| {
                error!(block = name, requirement = %requirement, error = %e, "Failed to install requirement");
            })?;
            state.installs.push(requirement.clone());
            res.new_installs.push(requirement.clone());
        } else {
            warn!(
                block = name,
                requirement = %requirement,
                "Installs are disabled; requirement left unresolved"
            );
            res.pending_installs.push(requirement.clone());
        }
    }

    for phase in HookPhase::ALL {
        res.new_hooks |= state.hooks.attach(phase, hooks.get(phase));
    }
    res.requires_restart |= res.new_hooks;

    Ok(res)
}
