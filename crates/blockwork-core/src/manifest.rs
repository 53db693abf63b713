//! Block manifest parsing.
//!
//! A manifest is the `block_config.toml` file at the root of a block
//! directory. Fields live under a `[block]` table, or at the top level when
//! that table is absent:
//!
//! ```toml
//! [block]
//! name = "blog"
//! version = "0.2"
//! requirements = ["markdown"]
//! dependencies = ["homepage"]
//! statics = "static"
//! templates_dir = "templates"
//! template_router = "router.rs"
//! api_router = "api.rs"
//! load_order = 3
//! start_hooks = ["warm_cache"]
//! ```
//!
//! Relative paths resolve against the block directory. Static and template
//! directories become absolute paths; router and settings files become module
//! references (see [`crate::module_path`]).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BlockError, BlockResult};
use crate::info::BlockInfo;
use crate::module_path::{path_to_module, resolve_relative};
use crate::name::BlockName;
use crate::schema::CompositeSchema;
use crate::version::BlockVersion;

/// Manifest file name inside every block directory.
pub const MANIFEST_FILE_NAME: &str = "block_config.toml";

/// Table holding the manifest fields.
pub const MANIFEST_SECTION: &str = "block";

/// Load order for blocks that do not declare one.
pub const DEFAULT_LOAD_ORDER: i64 = 9;

/// Keys computed during parsing; a manifest cannot set them.
const DERIVED_KEYS: &[&str] = &["block_path", "module"];

fn default_load_order() -> i64 {
    DEFAULT_LOAD_ORDER
}

/// Hook declarations for the four lifecycle phases.
///
/// Entries are `"function"`, `"module.ref:function"`, or
/// `"relative/file.rs:function"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookDecls {
    /// Run once after `setup`.
    pub setup: Vec<String>,
    /// Run once when activation starts.
    pub start: Vec<String>,
    /// Run before each block is mounted.
    pub preload: Vec<String>,
    /// Run after each block is mounted.
    pub postload: Vec<String>,
}

impl HookDecls {
    /// Append another set of declarations after this one.
    pub fn extend(&mut self, other: HookDecls) {
        self.setup.extend(other.setup);
        self.start.extend(other.start);
        self.preload.extend(other.preload);
        self.postload.extend(other.postload);
    }

    /// Whether no hooks are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.setup.is_empty()
            && self.start.is_empty()
            && self.preload.is_empty()
            && self.postload.is_empty()
    }
}

#[derive(Deserialize)]
struct RawManifest {
    name: String,
    version: BlockVersion,
    #[serde(default)]
    requirements: Vec<String>,
    #[serde(default, alias = "dependancies")]
    dependencies: Vec<String>,
    statics: Option<String>,
    templates_dir: Option<String>,
    template_router: Option<String>,
    api_router: Option<String>,
    #[serde(alias = "extra_block_settings")]
    extra_settings: Option<String>,
    schemas: Option<Vec<String>>,
    #[serde(default = "default_load_order")]
    load_order: i64,
    #[serde(default)]
    setup_hooks: Vec<String>,
    #[serde(default)]
    start_hooks: Vec<String>,
    #[serde(default)]
    preload_hooks: Vec<String>,
    #[serde(default)]
    postload_hooks: Vec<String>,
    #[serde(flatten)]
    extra: toml::Table,
}

/// Persisted form read back by [`BlockManifest::from_info`]. Paths are
/// already resolved.
#[derive(Deserialize)]
struct StoredManifest {
    name: BlockName,
    version: BlockVersion,
    block_path: PathBuf,
    module: String,
    #[serde(default)]
    requirements: Vec<String>,
    #[serde(default, alias = "dependancies")]
    dependencies: Vec<String>,
    statics: Option<PathBuf>,
    templates_dir: Option<PathBuf>,
    template_router: Option<String>,
    api_router: Option<String>,
    #[serde(alias = "extra_block_settings")]
    extra_settings: Option<String>,
    schemas: Option<Vec<String>>,
    #[serde(default = "default_load_order")]
    load_order: i64,
    #[serde(flatten)]
    extra: toml::Table,
}

/// A validated block manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockManifest {
    /// Unique block name.
    pub name: BlockName,
    /// Version token.
    pub version: BlockVersion,
    /// Absolute block directory.
    pub block_path: PathBuf,
    /// Module reference of the block directory.
    pub module: String,
    /// External packages the block needs.
    pub requirements: Vec<String>,
    /// Blocks that must be registered first.
    pub dependencies: Vec<String>,
    /// Static asset directory.
    pub statics: Option<PathBuf>,
    /// Template directory shared with every block.
    pub templates_dir: Option<PathBuf>,
    /// Module reference of the page router.
    pub template_router: Option<String>,
    /// Module reference of the API router.
    pub api_router: Option<String>,
    /// Module reference of the schema extension.
    pub extra_settings: Option<String>,
    /// Module references of schema modules; never `Some(vec![])`.
    pub schemas: Option<Vec<String>>,
    /// Activation order; lower loads earlier.
    pub load_order: i64,
    /// Lifecycle hook declarations. Not persisted in [`BlockInfo`].
    pub hooks: HookDecls,
    /// Open extension fields.
    pub extra: toml::Table,
}

impl BlockManifest {
    /// Read and parse the manifest in `block_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::Io`] or [`BlockError::Parse`] if the file cannot
    /// be read as TOML, or [`BlockError::Validation`] if it violates the schema.
    pub fn load(
        block_dir: &Path,
        project_root: &Path,
        schema: &CompositeSchema,
    ) -> BlockResult<Self> {
        let path = block_dir.join(MANIFEST_FILE_NAME);
        let content =
            std::fs::read_to_string(&path).map_err(|e| BlockError::io(&path, e))?;
        let doc: toml::Table = toml::from_str(&content).map_err(|e| BlockError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&doc, block_dir, project_root, schema)
    }

    /// Parse a manifest document for the block at `block_path`.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::Validation`] for a bad name, a missing required
    /// field, or an extension field of the wrong type.
    pub fn parse(
        doc: &toml::Table,
        block_path: &Path,
        project_root: &Path,
        schema: &CompositeSchema,
    ) -> BlockResult<Self> {
        let label = block_path
            .file_name()
            .map_or_else(|| block_path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let invalid = |block: &str, message: String| BlockError::Validation {
            block: block.to_string(),
            message,
        };

        let mut table = match doc.get(MANIFEST_SECTION) {
            Some(toml::Value::Table(section)) => section.clone(),
            _ => doc.clone(),
        };

        schema
            .apply_fields(&mut table, block_path, project_root)
            .map_err(|m| invalid(&label, m))?;

        let raw = RawManifest::deserialize(toml::Value::Table(table))
            .map_err(|e| invalid(&label, e.to_string()))?;

        let name = BlockName::new(raw.name)?;
        let mut extra = raw.extra;
        for key in DERIVED_KEYS {
            if extra.remove(*key).is_some() {
                tracing::debug!(block = %name, key, "Ignoring derived key in manifest");
            }
        }

        let module_of = |rel: &str| path_to_module(&resolve_relative(block_path, rel), project_root);
        let schemas = raw
            .schemas
            .filter(|s| !s.is_empty())
            .map(|s| s.iter().map(|p| module_of(p)).collect());

        let manifest = Self {
            module: path_to_module(block_path, project_root),
            block_path: block_path.to_path_buf(),
            version: raw.version,
            requirements: raw.requirements,
            dependencies: raw.dependencies,
            statics: raw.statics.map(|s| resolve_relative(block_path, &s)),
            templates_dir: raw.templates_dir.map(|s| resolve_relative(block_path, &s)),
            template_router: raw.template_router.as_deref().map(module_of),
            api_router: raw.api_router.as_deref().map(module_of),
            extra_settings: raw.extra_settings.as_deref().map(module_of),
            schemas,
            load_order: raw.load_order,
            hooks: HookDecls {
                setup: raw.setup_hooks,
                start: raw.start_hooks,
                preload: raw.preload_hooks,
                postload: raw.postload_hooks,
            },
            extra,
            name,
        };

        Ok(schema.contribute(manifest))
    }

    /// Rebuild a manifest from its persisted record. Hook declarations are
    /// not persisted and come back empty.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::Validation`] if the record lacks required fields.
    pub fn from_info(info: &BlockInfo) -> BlockResult<Self> {
        let stored = StoredManifest::deserialize(toml::Value::Table(info.as_table().clone()))
            .map_err(|e| BlockError::Validation {
                block: info.name().unwrap_or("<unnamed>").to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: stored.name,
            version: stored.version,
            block_path: stored.block_path,
            module: stored.module,
            requirements: stored.requirements,
            dependencies: stored.dependencies,
            statics: stored.statics,
            templates_dir: stored.templates_dir,
            template_router: stored.template_router,
            api_router: stored.api_router,
            extra_settings: stored.extra_settings,
            schemas: stored.schemas.filter(|s| !s.is_empty()),
            load_order: stored.load_order,
            hooks: HookDecls::default(),
            extra: stored.extra,
        })
    }

    /// Dense persisted record: absent optional fields are omitted.
    #[must_use]
    pub fn to_info(&self) -> BlockInfo {
        use toml::Value;

        let mut t = self.extra.clone();
        let strings = |v: &[String]| Value::Array(v.iter().cloned().map(Value::String).collect());
        let path = |p: &Path| Value::String(p.display().to_string());

        t.insert("name".into(), Value::String(self.name.to_string()));
        t.insert("version".into(), Value::String(self.version.to_string()));
        t.insert("block_path".into(), path(&self.block_path));
        t.insert("module".into(), Value::String(self.module.clone()));
        t.insert("requirements".into(), strings(&self.requirements));
        t.insert("dependencies".into(), strings(&self.dependencies));
        t.insert("load_order".into(), Value::Integer(self.load_order));

        if let Some(p) = &self.statics {
            t.insert("statics".into(), path(p));
        }
        if let Some(p) = &self.templates_dir {
            t.insert("templates_dir".into(), path(p));
        }
        for (key, value) in [
            ("template_router", &self.template_router),
            ("api_router", &self.api_router),
            ("extra_settings", &self.extra_settings),
        ] {
            if let Some(v) = value {
                t.insert(key.into(), Value::String(v.clone()));
            }
        }
        if let Some(s) = &self.schemas {
            t.insert("schemas".into(), strings(s));
        }

        BlockInfo::from_table(t)
    }
}
