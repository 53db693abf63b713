//! Host-side hook registration.

use std::fmt;
use std::sync::Arc;

use blockwork_core::BlockInfo;
use indexmap::IndexMap;

use crate::hook::{HookPhase, HookRef};

/// Context passed to every hook invocation.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    /// Phase being run.
    pub phase: HookPhase,
    /// Block being mounted; set for preload and postload hooks only.
    pub block: Option<&'a BlockInfo>,
    /// Every registered block.
    pub blocks: &'a IndexMap<String, BlockInfo>,
    /// Span of the running operation, for hooks that log.
    pub span: &'a tracing::Span,
}

/// A hook callable.
pub type HookFn = Arc<dyn Fn(&HookContext<'_>) + Send + Sync>;

/// Table of hook callables keyed by their stable [`HookRef`].
///
/// The host fills the catalog at startup. Persisted hook references are
/// looked up here at activation time, so a block's hook function is only
/// callable if the host registered it under the declared module and name.
#[derive(Clone, Default)]
pub struct HookCatalog {
    hooks: IndexMap<HookRef, HookFn>,
}

impl HookCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook callable, replacing any earlier one with the same identity.
    pub fn register<F>(&mut self, module: impl Into<String>, function: impl Into<String>, f: F)
    where
        F: Fn(&HookContext<'_>) + Send + Sync + 'static,
    {
        self.hooks.insert(HookRef::new(module, function), Arc::new(f));
    }

    /// Look up a hook callable.
    #[must_use]
    pub fn get(&self, hook: &HookRef) -> Option<&HookFn> {
        self.hooks.get(hook)
    }

    /// Whether a callable is registered for `hook`.
    #[must_use]
    pub fn contains(&self, hook: &HookRef) -> bool {
        self.hooks.contains_key(hook)
    }

    /// Number of registered callables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.keys().map(ToString::to_string))
            .finish()
    }
}
