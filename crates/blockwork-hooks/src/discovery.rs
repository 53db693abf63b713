//! Hook discovery from block manifests.

use std::path::Path;

use blockwork_core::BlockManifest;
use tracing::debug;

use crate::hook::{HookError, HookPhase, HookRef};

/// Hooks declared by one block, per phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredHooks {
    setup: Vec<HookRef>,
    start: Vec<HookRef>,
    preload: Vec<HookRef>,
    postload: Vec<HookRef>,
}

impl DiscoveredHooks {
    /// Hooks for a phase, in declaration order.
    #[must_use]
    pub fn get(&self, phase: HookPhase) -> &[HookRef] {
        match phase {
            HookPhase::Setup => &self.setup,
            HookPhase::Start => &self.start,
            HookPhase::BlockPreload => &self.preload,
            HookPhase::BlockPostload => &self.postload,
        }
    }

    /// Total number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        HookPhase::ALL.iter().map(|p| self.get(*p).len()).sum()
    }

    /// Whether no hook was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse the hook declarations of a manifest.
///
/// # Errors
///
/// Returns [`HookError::InvalidReference`] for the first malformed declaration.
pub fn discover_hooks(
    manifest: &BlockManifest,
    project_root: &Path,
) -> Result<DiscoveredHooks, HookError> {
    let parse_all = |decls: &[String]| -> Result<Vec<HookRef>, HookError> {
        decls
            .iter()
            .map(|d| HookRef::parse(d, &manifest.module, &manifest.block_path, project_root))
            .collect()
    };

    let hooks = DiscoveredHooks {
        setup: parse_all(&manifest.hooks.setup)?,
        start: parse_all(&manifest.hooks.start)?,
        preload: parse_all(&manifest.hooks.preload)?,
        postload: parse_all(&manifest.hooks.postload)?,
    };

    debug!(block = %manifest.name, count = hooks.len(), "Discovered block hooks");
    Ok(hooks)
}
