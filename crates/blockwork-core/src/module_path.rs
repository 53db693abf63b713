//! Conversion between filesystem paths and dotted module references.
//!
//! A module reference is a path relative to the project root, with a trailing
//! source suffix removed and components joined by `.`:
//! `<root>/blocks/blog/router.rs` becomes `blocks.blog.router`.

use std::path::{Component, Path, PathBuf};

/// Source-file suffixes stripped from the final path component.
pub const SOURCE_SUFFIXES: &[&str] = &["rs", "py"];

/// Lexically normalize a path, folding `.` and `..` components.
///
/// The filesystem is not consulted, so symlinks are not resolved. A `..` that
/// would climb above the root is dropped.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !path.has_root() {
                    out.push("..");
                }
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a manifest-relative path against the block directory.
#[must_use]
pub fn resolve_relative(block_path: &Path, relative: &str) -> PathBuf {
    normalize(&block_path.join(relative))
}

/// Convert a filesystem path into a module reference relative to `project_root`.
///
/// Relative inputs are taken relative to `project_root`. Paths outside the
/// project root cannot be expressed as a module and are returned as their
/// absolute path string.
#[must_use]
pub fn path_to_module(path: &Path, project_root: &Path) -> String {
    let root = normalize(project_root);
    let absolute = if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&root.join(path))
    };

    let Ok(relative) = absolute.strip_prefix(&root) else {
        return absolute.display().to_string();
    };

    let mut parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if let Some(last) = parts.last_mut()
        && let Some((stem, ext)) = last.rsplit_once('.')
        && SOURCE_SUFFIXES.contains(&ext)
        && !stem.is_empty()
    {
        *last = stem.to_string();
    }

    parts.join(".")
}

/// Whether a string looks like a module reference rather than an absolute
/// path fallback.
#[must_use]
pub fn is_module_ref(reference: &str) -> bool {
    !reference.is_empty() && !Path::new(reference).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize(Path::new("/a/b/./c/../d")),
            PathBuf::from("/a/b/d")
        );
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn module_from_source_file() {
        let root = Path::new("/srv/app");
        assert_eq!(
            path_to_module(Path::new("/srv/app/blocks/blog/router.rs"), root),
            "blocks.blog.router"
        );
        assert_eq!(
            path_to_module(Path::new("/srv/app/blocks/blog/api_router.py"), root),
            "blocks.blog.api_router"
        );
    }

    #[test]
    fn module_from_directory() {
        let root = Path::new("/srv/app");
        assert_eq!(
            path_to_module(Path::new("/srv/app/blocks/blog"), root),
            "blocks.blog"
        );
        assert_eq!(path_to_module(Path::new("blocks/./blog"), root), "blocks.blog");
    }

    #[test]
    fn other_suffixes_are_kept() {
        let root = Path::new("/srv/app");
        assert_eq!(
            path_to_module(Path::new("/srv/app/blocks/blog/index.html"), root),
            "blocks.blog.index.html"
        );
    }

    #[test]
    fn outside_root_stays_absolute() {
        let root = Path::new("/srv/app");
        let module = path_to_module(Path::new("/srv/app/../shared/router.rs"), root);
        assert_eq!(module, "/srv/shared/router.rs");
        assert!(!is_module_ref(&module));
    }

    #[test]
    fn resolve_relative_joins_and_normalizes() {
        assert_eq!(
            resolve_relative(Path::new("/srv/app/blocks/blog"), "./static"),
            PathBuf::from("/srv/app/blocks/blog/static")
        );
        assert_eq!(
            resolve_relative(Path::new("/srv/app/blocks/blog"), "../shared/templates"),
            PathBuf::from("/srv/app/blocks/shared/templates")
        );
    }
}
