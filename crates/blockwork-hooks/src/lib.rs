//! Blockwork Hooks - lifecycle extension points contributed by blocks.
//!
//! Blocks declare hooks in their manifests for four phases:
//! - `setup`: once after a successful `setup`
//! - `start`: once when activation begins
//! - `blockPreload` / `blockPostload`: around the mounting of each block
//!
//! Declarations are persisted in the registry's [`HookTable`] as
//! `module -> [function]` references. At activation the table is resolved
//! against a [`HookCatalog`] filled by the host, so no runtime lookup by name
//! is needed beyond the catalog itself.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod catalog;
pub mod discovery;
pub mod executor;
pub mod hook;
pub mod table;

pub use catalog::{HookCatalog, HookContext, HookFn};
pub use discovery::{DiscoveredHooks, discover_hooks};
pub use executor::run;
pub use hook::{HookError, HookPhase, HookRef};
pub use table::{HookGroup, HookTable, ResolvedHook};
