//! Hook phases and references.

use std::fmt;
use std::path::Path;

use blockwork_core::BlockError;
use blockwork_core::module_path::{path_to_module, resolve_relative};
use thiserror::Error;

/// Errors from hook declarations.
#[derive(Debug, Error)]
pub enum HookError {
    /// A hook declaration could not be parsed.
    #[error("invalid hook reference '{reference}': {message}")]
    InvalidReference {
        /// The declaration as written.
        reference: String,
        /// What was wrong.
        message: String,
    },
}

impl HookError {
    /// Attribute the error to `block` as a manifest validation failure.
    #[must_use]
    pub fn for_block(self, block: &str) -> BlockError {
        BlockError::Validation {
            block: block.to_string(),
            message: self.to_string(),
        }
    }
}

/// Lifecycle phase a hook runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// Once, after a successful `setup`.
    Setup,
    /// Once, when activation starts.
    Start,
    /// Before each block is mounted.
    BlockPreload,
    /// After each block is mounted.
    BlockPostload,
}

impl HookPhase {
    /// Every phase, in lifecycle order.
    pub const ALL: [HookPhase; 4] = [
        Self::Setup,
        Self::Start,
        Self::BlockPreload,
        Self::BlockPostload,
    ];

    /// Group name in the registry document.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::BlockPreload => "blockPreload",
            Self::BlockPostload => "blockPostload",
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a hook: owning module reference plus function name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookRef {
    /// Module reference, e.g. `blocks.blog.hooks`.
    pub module: String,
    /// Function name within the module.
    pub function: String,
}

impl HookRef {
    /// Create a reference.
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
        }
    }

    /// Parse a manifest hook declaration.
    ///
    /// - `"function"` refers to `block_module`
    /// - `"module.ref:function"` refers to another module
    /// - `"relative/file.rs:function"` is resolved against `block_path` and
    ///   converted to a module reference
    ///
    /// # Errors
    ///
    /// Returns [`HookError::InvalidReference`] if the module or function part
    /// is empty, or the function is not an identifier.
    pub fn parse(
        decl: &str,
        block_module: &str,
        block_path: &Path,
        project_root: &Path,
    ) -> Result<Self, HookError> {
        let invalid = |message: &str| HookError::InvalidReference {
            reference: decl.to_string(),
            message: message.to_string(),
        };

        let (module, function) = match decl.rsplit_once(':') {
            None => (block_module.to_string(), decl.trim()),
            Some((target, function)) => {
                let target = target.trim();
                if target.is_empty() {
                    return Err(invalid("module part is empty"));
                }
                let module = if looks_like_file(target) {
                    path_to_module(&resolve_relative(block_path, target), project_root)
                } else {
                    target.to_string()
                };
                (module, function.trim())
            },
        };

        if function.is_empty() {
            return Err(invalid("function part is empty"));
        }
        if !function
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid("function must be an identifier"));
        }

        Ok(Self::new(module, function))
    }
}

fn looks_like_file(target: &str) -> bool {
    target.contains('/')
        || target.contains('\\')
        || Path::new(target)
            .extension()
            .is_some_and(|e| blockwork_core::module_path::SOURCE_SUFFIXES.iter().any(|s| e == *s))
}

impl fmt::Display for HookRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(decl: &str) -> Result<HookRef, HookError> {
        HookRef::parse(
            decl,
            "blocks.blog",
            Path::new("/srv/app/blocks/blog"),
            Path::new("/srv/app"),
        )
    }

    #[test]
    fn bare_function_uses_block_module() {
        assert_eq!(parse("warm_cache").unwrap(), HookRef::new("blocks.blog", "warm_cache"));
    }

    #[test]
    fn explicit_module() {
        assert_eq!(
            parse("blocks.shared.hooks:announce").unwrap(),
            HookRef::new("blocks.shared.hooks", "announce")
        );
    }

    #[test]
    fn file_path_is_resolved() {
        assert_eq!(
            parse("hooks.rs:announce").unwrap(),
            HookRef::new("blocks.blog.hooks", "announce")
        );
        assert_eq!(
            parse("lib/hooks.py:announce").unwrap(),
            HookRef::new("blocks.blog.lib.hooks", "announce")
        );
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse("").is_err());
        assert!(parse(":announce").is_err());
        assert!(parse("blocks.blog:").is_err());
        assert!(parse("blocks.blog:not-ident").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let r = HookRef::new("blocks.shared.hooks", "announce");
        assert_eq!(parse(&r.to_string()).unwrap(), r);
    }

    #[test]
    fn phase_names() {
        let names: Vec<_> = HookPhase::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["setup", "start", "blockPreload", "blockPostload"]);
    }
}
