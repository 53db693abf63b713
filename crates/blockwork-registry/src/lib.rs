//! Blockwork Registry - persistent block state and composition.
//!
//! - [`RegistryState`] / [`RegistryStore`]: the `block_infos.toml` document
//! - [`resolve_block`]: dependency checks, additive merge, requirement installs
//! - [`IntegrityVerifier`] / [`HashRecord`]: per-block content digests
//! - [`HostApp`], [`RouterCatalog`], [`TemplateEnvironment`]: host collaborators
//! - [`BlockManager`]: `setup` and `activate`

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod fs;

pub mod host;
pub mod installer;
pub mod integrity;
pub mod manager;
pub mod resolver;
pub mod state;
pub mod store;

pub use host::{
    API_ROUTER_PREFIX, HostApp, Route, RouteGroup, RouterCatalog, RouterFactory,
    TEMPLATE_ROUTER_PREFIX, TemplateEnvironment,
};
pub use installer::{CommandInstaller, PackageInstaller};
pub use integrity::{HashRecord, IntegrityVerifier, Verification, compute_digest};
pub use manager::{
    ActivationReport, BlockManager, BlockModules, ManagerOptions, ManagerStage, SetupReport,
};
pub use resolver::{Resolution, resolve_block};
pub use state::{RegistrySettings, RegistryState};
pub use store::{HASH_FILE, REGISTRY_FILE, RegistryStore, STATE_DIR};
