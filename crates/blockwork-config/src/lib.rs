//! Layered configuration for blockwork.
//!
//! Embedded defaults are overlaid by the user config file, then the
//! workspace `blockwork.toml`, then `BLOCKWORK_*` environment variables
//! for any field neither file set.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod env;
pub mod error;
pub mod loader;
pub mod merge;
pub mod types;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ResolvedConfig, WORKSPACE_CONFIG_FILE, defaults, load, load_with_env, user_config_path};
pub use types::{BlocksSection, Config, LoggingSection};
