//! Core types for blockwork block discovery and composition.
//!
//! A block is a self-contained feature directory with a `block_config.toml`
//! manifest. This crate provides:
//!
//! - [`BlockName`] and [`BlockVersion`]: validated identity
//! - [`BlockManifest`]: parsed, path-resolved manifest
//! - [`BlockInfo`]: the dense record persisted in the registry document
//! - [`SchemaExtension`] / [`build_schema`]: manifest fields contributed by blocks
//! - [`discover_block_dirs`]: filesystem scan of a blocks folder
//! - [`BlockError`]: the error taxonomy shared by every blockwork crate

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod discovery;
pub mod error;
pub mod info;
pub mod manifest;
pub mod module_path;
pub mod name;
pub mod schema;
pub mod version;

pub use discovery::discover_block_dirs;
pub use error::{BlockError, BlockResult};
pub use info::BlockInfo;
pub use manifest::{BlockManifest, DEFAULT_LOAD_ORDER, HookDecls, MANIFEST_FILE_NAME};
pub use module_path::path_to_module;
pub use name::BlockName;
pub use schema::{
    CompositeSchema, ExtensionCatalog, FieldKind, FieldSpec, SchemaExtension, build_schema,
};
pub use version::BlockVersion;
