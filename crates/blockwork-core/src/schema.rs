//! Manifest schema extensions.
//!
//! A block can extend the manifest schema of every block parsed after it by
//! naming a settings module in its `extra_settings` field. The host registers a
//! [`SchemaExtension`] for that module in an [`ExtensionCatalog`], and each
//! `setup` run folds the known extensions into one [`CompositeSchema`]:
//!
//! - [`SchemaExtension::fields`] adds typed fields with optional defaults
//! - [`SchemaExtension::contribute`] transforms the parsed manifest, appending
//!   to whatever earlier extensions contributed

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::manifest::BlockManifest;
use crate::module_path::{path_to_module, resolve_relative};

/// Value type of an extension field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    String,
    /// `true` / `false`.
    Bool,
    /// Signed integer.
    Integer,
    /// Floating point; integers are accepted and widened.
    Float,
    /// Array of strings.
    StringList,
    /// Path relative to the block directory, stored absolute.
    FsPath,
    /// Path relative to the block directory, stored as a module reference.
    ModuleRef,
    /// Array of paths, each stored as a module reference.
    ModuleList,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::StringList => "string list",
            Self::FsPath => "path",
            Self::ModuleRef => "module path",
            Self::ModuleList => "module path list",
        };
        f.write_str(name)
    }
}

/// A manifest field contributed by an extension.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Key in the manifest document.
    pub name: String,
    /// Expected value type.
    pub kind: FieldKind,
    /// Value used when the manifest omits the key.
    pub default: Option<toml::Value>,
}

impl FieldSpec {
    /// A field with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<toml::Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Type-check this field in `table`, fill its default, and resolve path
    /// kinds against `block_path`.
    ///
    /// # Errors
    ///
    /// Returns a message describing the type mismatch.
    pub fn apply(
        &self,
        table: &mut toml::Table,
        block_path: &Path,
        project_root: &Path,
    ) -> Result<(), String> {
        let value = match table.remove(&self.name) {
            Some(v) => v,
            None => match &self.default {
                Some(d) => d.clone(),
                None => return Ok(()),
            },
        };
        let resolved = self.coerce(value, block_path, project_root)?;
        table.insert(self.name.clone(), resolved);
        Ok(())
    }

    fn coerce(
        &self,
        value: toml::Value,
        block_path: &Path,
        project_root: &Path,
    ) -> Result<toml::Value, String> {
        use toml::Value;

        let mismatch = |v: &Value| {
            format!(
                "field '{}' expects {}, got {}",
                self.name,
                self.kind,
                v.type_str()
            )
        };
        let module = |s: &str| {
            Value::String(path_to_module(
                &resolve_relative(block_path, s),
                project_root,
            ))
        };

        match (self.kind, value) {
            (FieldKind::String, v @ Value::String(_))
            | (FieldKind::Bool, v @ Value::Boolean(_))
            | (FieldKind::Integer, v @ Value::Integer(_))
            | (FieldKind::Float, v @ Value::Float(_)) => Ok(v),
            #[allow(clippy::cast_precision_loss)]
            (FieldKind::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
            (FieldKind::StringList, Value::Array(items)) => {
                if let Some(bad) = items.iter().find(|v| !v.is_str()) {
                    return Err(mismatch(bad));
                }
                Ok(Value::Array(items))
            },
            (FieldKind::FsPath, Value::String(s)) => Ok(Value::String(
                resolve_relative(block_path, &s).display().to_string(),
            )),
            (FieldKind::ModuleRef, Value::String(s)) => Ok(module(&s)),
            (FieldKind::ModuleList, Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map(module).ok_or_else(|| mismatch(v)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (_, v) => Err(mismatch(&v)),
        }
    }
}

/// A manifest schema extension provided by a block's settings module.
pub trait SchemaExtension: Send + Sync {
    /// Additional manifest fields.
    fn fields(&self) -> Vec<FieldSpec> {
        Vec::new()
    }

    /// Transform a parsed manifest. Implementations append to collections
    /// such as hook declarations rather than replacing them.
    fn contribute(&self, manifest: BlockManifest) -> BlockManifest {
        manifest
    }
}

/// Extensions known to the host, keyed by settings module reference.
#[derive(Clone, Default)]
pub struct ExtensionCatalog {
    extensions: IndexMap<String, Arc<dyn SchemaExtension>>,
}

impl ExtensionCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the extension for a settings module, replacing any earlier one.
    pub fn register(&mut self, module: impl Into<String>, extension: impl SchemaExtension + 'static) {
        self.extensions.insert(module.into(), Arc::new(extension));
    }

    /// Look up an extension by module reference.
    #[must_use]
    pub fn get(&self, module: &str) -> Option<&Arc<dyn SchemaExtension>> {
        self.extensions.get(module)
    }

    /// Number of registered extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Debug for ExtensionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionCatalog")
            .field("modules", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The manifest schema for one `setup` run.
#[derive(Clone, Default)]
pub struct CompositeSchema {
    fields: Vec<FieldSpec>,
    extensions: Vec<(String, Arc<dyn SchemaExtension>)>,
}

impl CompositeSchema {
    /// The base schema with no extensions.
    #[must_use]
    pub fn base() -> Self {
        Self::default()
    }

    /// Extension fields in fold order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Module references of the folded extensions.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|(m, _)| m.as_str())
    }

    /// Apply every extension field to a raw manifest table.
    ///
    /// # Errors
    ///
    /// Returns the first field type mismatch.
    pub fn apply_fields(
        &self,
        table: &mut toml::Table,
        block_path: &Path,
        project_root: &Path,
    ) -> Result<(), String> {
        for field in &self.fields {
            field.apply(table, block_path, project_root)?;
        }
        Ok(())
    }

    /// Fold every extension's contribution over a parsed manifest.
    #[must_use]
    pub fn contribute(&self, manifest: BlockManifest) -> BlockManifest {
        self.extensions
            .iter()
            .fold(manifest, |m, (_, ext)| ext.contribute(m))
    }

    fn push(&mut self, module: &str, extension: Arc<dyn SchemaExtension>) {
        for field in extension.fields() {
            if self.fields.iter().any(|f| f.name == field.name) {
                debug!(module, field = %field.name, "Field already defined by an earlier extension");
                continue;
            }
            self.fields.push(field);
        }
        self.extensions.push((module.to_string(), extension));
    }
}

impl fmt::Debug for CompositeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSchema")
            .field("fields", &self.fields)
            .field("modules", &self.modules().collect::<Vec<_>>())
            .finish()
    }
}

/// Build the composite schema from the registry's extension module list.
///
/// Modules without a registered extension are skipped with a warning.
#[must_use]
pub fn build_schema<S: AsRef<str>>(modules: &[S], catalog: &ExtensionCatalog) -> CompositeSchema {
    let mut schema = CompositeSchema::base();
    for module in modules {
        let module = module.as_ref();
        if schema.modules().any(|m| m == module) {
            continue;
        }
        match catalog.get(module) {
            Some(ext) => schema.push(module, Arc::clone(ext)),
            None => warn!(module, "No schema extension registered for settings module, skipping"),
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Homepage;

    impl SchemaExtension for Homepage {
        fn fields(&self) -> Vec<FieldSpec> {
            vec![FieldSpec::new("is_main", FieldKind::Bool).with_default(false)]
        }
    }

    struct Database;

    impl SchemaExtension for Database {
        fn fields(&self) -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("models", FieldKind::ModuleList),
                FieldSpec::new("is_main", FieldKind::String),
            ]
        }
    }

    fn root() -> &'static Path {
        Path::new("/srv/app")
    }

    fn block() -> &'static Path {
        Path::new("/srv/app/blocks/blog")
    }

    #[test]
    fn unknown_modules_are_skipped() {
        let mut catalog = ExtensionCatalog::new();
        catalog.register("blocks.homepage.settings", Homepage);
        let schema = build_schema(
            &["blocks.missing.settings", "blocks.homepage.settings"],
            &catalog,
        );
        assert_eq!(schema.modules().collect::<Vec<_>>(), vec!["blocks.homepage.settings"]);
        assert_eq!(schema.fields().len(), 1);
    }

    #[test]
    fn first_field_definition_wins() {
        let mut catalog = ExtensionCatalog::new();
        catalog.register("a", Homepage);
        catalog.register("b", Database);
        let schema = build_schema(&["a", "b", "a"], &catalog);
        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["is_main", "models"]);
        assert_eq!(schema.fields()[0].kind, FieldKind::Bool);
    }

    #[test]
    fn defaults_fill_absent_fields() {
        let spec = FieldSpec::new("is_main", FieldKind::Bool).with_default(false);
        let mut table = toml::Table::new();
        spec.apply(&mut table, block(), root()).unwrap();
        assert_eq!(table.get("is_main"), Some(&toml::Value::Boolean(false)));

        let bare = FieldSpec::new("title", FieldKind::String);
        bare.apply(&mut table, block(), root()).unwrap();
        assert!(!table.contains_key("title"));
    }

    #[test]
    fn type_mismatch_is_reported() {
        let spec = FieldSpec::new("is_main", FieldKind::Bool);
        let mut table: toml::Table = toml::from_str("is_main = \"yes\"").unwrap();
        let err = spec.apply(&mut table, block(), root()).unwrap_err();
        assert!(err.contains("is_main"));
        assert!(err.contains("bool"));
    }

    #[test]
    fn path_kinds_resolve_against_block() {
        let mut table: toml::Table = toml::from_str(
            r#"
            models = ["models.rs", "sub/more.rs"]
            assets = "./assets"
            entry = "entry.rs"
            "#,
        )
        .unwrap();
        FieldSpec::new("models", FieldKind::ModuleList)
            .apply(&mut table, block(), root())
            .unwrap();
        FieldSpec::new("assets", FieldKind::FsPath)
            .apply(&mut table, block(), root())
            .unwrap();
        FieldSpec::new("entry", FieldKind::ModuleRef)
            .apply(&mut table, block(), root())
            .unwrap();

        let models: Vec<_> = table["models"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(models, vec!["blocks.blog.models", "blocks.blog.sub.more"]);
        assert_eq!(table["assets"].as_str(), Some("/srv/app/blocks/blog/assets"));
        assert_eq!(table["entry"].as_str(), Some("blocks.blog.entry"));
    }

    #[test]
    fn integers_widen_to_float() {
        let mut table: toml::Table = toml::from_str("ratio = 2").unwrap();
        FieldSpec::new("ratio", FieldKind::Float)
            .apply(&mut table, block(), root())
            .unwrap();
        assert_eq!(table["ratio"].as_float(), Some(2.0));
    }
}
