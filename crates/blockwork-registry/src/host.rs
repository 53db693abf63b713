//! Interfaces to the host web application.
//!
//! The registry never touches HTTP handling or template syntax. It needs a
//! place to mount route groups and static directories ([`HostApp`]), a way
//! to obtain the route group a block's router module provides
//! ([`RouterCatalog`]), and a list of template roots
//! ([`TemplateEnvironment`]).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

/// URL prefix of template (page) routers.
pub const TEMPLATE_ROUTER_PREFIX: &str = "";
/// URL prefix of API routers.
pub const API_ROUTER_PREFIX: &str = "/api";

/// One route in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// HTTP method.
    pub method: String,
    /// Path relative to the group prefix.
    pub path: String,
}

/// A named set of routes provided by a block router module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    /// Router name; the host mounts each name at most once.
    pub name: String,
    /// Routes in declaration order.
    pub routes: Vec<Route>,
}

impl RouteGroup {
    /// An empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: Vec::new(),
        }
    }

    /// Add a route.
    #[must_use]
    pub fn route(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.push(Route {
            method: method.into(),
            path: path.into(),
        });
        self
    }
}

/// The application blocks are mounted into.
pub trait HostApp {
    /// Whether a route group with this name is already mounted.
    fn has_route_group(&self, name: &str) -> bool;

    /// Mount a route group under `prefix`.
    fn mount_route_group(&mut self, prefix: &str, group: RouteGroup);

    /// Serve `path` at `url_prefix`, registered under `name`.
    fn mount_static_directory(&mut self, url_prefix: &str, path: &Path, name: &str);
}

/// Builds the route group a router module provides.
pub type RouterFactory = Arc<dyn Fn() -> RouteGroup + Send + Sync>;

/// Router modules known to the host, keyed by module reference.
#[derive(Clone, Default)]
pub struct RouterCatalog {
    routers: IndexMap<String, RouterFactory>,
}

impl RouterCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the router for a module reference.
    pub fn register<F>(&mut self, module: impl Into<String>, factory: F)
    where
        F: Fn() -> RouteGroup + Send + Sync + 'static,
    {
        self.routers.insert(module.into(), Arc::new(factory));
    }

    /// Build the route group for a module, if registered.
    #[must_use]
    pub fn build(&self, module: &str) -> Option<RouteGroup> {
        self.routers.get(module).map(|f| f())
    }

    /// Whether a module has a registered router.
    #[must_use]
    pub fn contains(&self, module: &str) -> bool {
        self.routers.contains_key(module)
    }
}

impl fmt::Debug for RouterCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routers.keys()).finish()
    }
}

/// Ordered template search roots shared by every block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateEnvironment {
    roots: Vec<PathBuf>,
}

impl TemplateEnvironment {
    /// Keep the directories that exist, in order, without duplicates.
    #[must_use]
    pub fn from_dirs(dirs: &[PathBuf]) -> Self {
        let mut roots: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            if dir.is_dir() && !roots.contains(dir) {
                roots.push(dir.clone());
            }
        }
        Self { roots }
    }

    /// Search roots in lookup order.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// First root containing `name`.
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(name))
            .find(|candidate| candidate.is_file())
    }
}
