//! Persisted hook table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{HookCatalog, HookFn};
use crate::hook::{HookPhase, HookRef};

/// Module reference to function names, in discovery order.
pub type HookGroup = IndexMap<String, Vec<String>>;

/// The `hooks` section of the registry document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookTable {
    /// Hooks run after `setup`.
    #[serde(default)]
    pub setup: HookGroup,
    /// Hooks run when activation starts.
    #[serde(default)]
    pub start: HookGroup,
    /// Hooks run before each block is mounted.
    #[serde(default, rename = "blockPreload")]
    pub block_preload: HookGroup,
    /// Hooks run after each block is mounted.
    #[serde(default, rename = "blockPostload")]
    pub block_postload: HookGroup,
}

/// A persisted reference paired with its callable.
#[derive(Clone)]
pub struct ResolvedHook {
    /// Identity of the hook.
    pub hook: HookRef,
    /// The callable.
    pub f: HookFn,
}

impl std::fmt::Debug for ResolvedHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ResolvedHook").field(&self.hook.to_string()).finish()
    }
}

impl HookTable {
    /// The group for a phase.
    #[must_use]
    pub fn group(&self, phase: HookPhase) -> &HookGroup {
        match phase {
            HookPhase::Setup => &self.setup,
            HookPhase::Start => &self.start,
            HookPhase::BlockPreload => &self.block_preload,
            HookPhase::BlockPostload => &self.block_postload,
        }
    }

    fn group_mut(&mut self, phase: HookPhase) -> &mut HookGroup {
        match phase {
            HookPhase::Setup => &mut self.setup,
            HookPhase::Start => &mut self.start,
            HookPhase::BlockPreload => &mut self.block_preload,
            HookPhase::BlockPostload => &mut self.block_postload,
        }
    }

    /// Record hooks for a phase. Entries already present are left alone.
    ///
    /// Returns `true` if any new entry was added.
    pub fn attach(&mut self, phase: HookPhase, hooks: &[HookRef]) -> bool {
        let group = self.group_mut(phase);
        let mut has_new = false;
        for hook in hooks {
            let functions = group.entry(hook.module.clone()).or_default();
            if !functions.contains(&hook.function) {
                debug!(phase = %phase, hook = %hook, "Attached hook");
                functions.push(hook.function.clone());
                has_new = true;
            }
        }
        has_new
    }

    /// Recorded references for a phase, in registration order.
    pub fn entries(&self, phase: HookPhase) -> impl Iterator<Item = HookRef> + '_ {
        self.group(phase).iter().flat_map(|(module, functions)| {
            functions
                .iter()
                .map(move |function| HookRef::new(module.clone(), function.clone()))
        })
    }

    /// Total number of recorded hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        HookPhase::ALL
            .iter()
            .map(|p| self.group(*p).values().map(Vec::len).sum::<usize>())
            .sum()
    }

    /// Whether no hook is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up every recorded hook for a phase in `catalog`.
    ///
    /// References without a registered callable are logged and skipped.
    #[must_use]
    pub fn resolve(&self, phase: HookPhase, catalog: &HookCatalog) -> Vec<ResolvedHook> {
        self.entries(phase)
            .filter_map(|hook| match catalog.get(&hook) {
                Some(f) => Some(ResolvedHook {
                    f: f.clone(),
                    hook,
                }),
                None => {
                    warn!(
                        phase = %phase,
                        hook = %hook,
                        "Hook is recorded but not registered by the host, skipping"
                    );
                    None
                },
            })
            .collect()
    }
}
