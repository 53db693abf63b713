//! Block error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from block discovery, resolution, and activation.
#[derive(Debug, Error)]
pub enum BlockError {
    /// No persisted registry document where one was required.
    #[error("no registry document found at {path}; please run setup first")]
    ConfigurationMissing {
        /// Expected location of the registry document.
        path: PathBuf,
    },

    /// The configured blocks folder does not exist.
    #[error("no blocks folder found at {path}")]
    BlocksFolderMissing {
        /// The folder that was scanned.
        path: PathBuf,
    },

    /// A manifest failed schema constraints.
    #[error("invalid manifest for {block}: {message}")]
    Validation {
        /// Block name, or the block directory when the name is unknown.
        block: String,
        /// What was wrong.
        message: String,
    },

    /// A declared dependency is not registered yet.
    #[error("block {block} depends on {dependency}, which is not registered")]
    MissingDependency {
        /// The block being resolved.
        block: String,
        /// The missing dependency.
        dependency: String,
    },

    /// External package installation failed.
    #[error("failed to install requirement {requirement}: {message}")]
    InstallFailure {
        /// The requirement identifier.
        requirement: String,
        /// Failure reason reported by the installer.
        message: String,
    },

    /// A block directory no longer matches its recorded digest.
    #[error("integrity check failed for block {block}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        /// Block directory name.
        block: String,
        /// Digest on record.
        expected: String,
        /// Digest computed now.
        actual: String,
    },

    /// A block's route or hook module could not be loaded.
    #[error("failed to import {module} for block {block}: {message}")]
    ImportFailure {
        /// The block being activated.
        block: String,
        /// The module reference that failed.
        module: String,
        /// Failure reason.
        message: String,
    },

    /// `activate` was called on a manager that already activated.
    #[error("block manager is already activated; create a new manager to recompose")]
    AlreadyActivated,

    /// Failed to parse a structured document.
    #[error("parse error in {path}: {message}")]
    Parse {
        /// Path to the document.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Failed to serialize a structured document.
    #[error("failed to serialize {path}: {message}")]
    Serialize {
        /// Destination path.
        path: PathBuf,
        /// Serializer message.
        message: String,
    },

    /// Filesystem error.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl BlockError {
    /// Wrap an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the run regardless of `allow_import_failure`.
    #[must_use]
    pub fn is_always_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing { .. }
                | Self::BlocksFolderMissing { .. }
                | Self::MissingDependency { .. }
                | Self::InstallFailure { .. }
                | Self::IntegrityMismatch { .. }
                | Self::AlreadyActivated
        )
    }
}

/// Result type for block operations.
pub type BlockResult<T> = Result<T, BlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        let missing = BlockError::MissingDependency {
            block: "comments".into(),
            dependency: "blog".into(),
        };
        assert!(missing.is_always_fatal());

        let import = BlockError::ImportFailure {
            block: "blog".into(),
            module: "blocks.blog.router".into(),
            message: "not registered".into(),
        };
        assert!(!import.is_always_fatal());

        let invalid = BlockError::Validation {
            block: "x".into(),
            message: "bad name".into(),
        };
        assert!(!invalid.is_always_fatal());
    }

    #[test]
    fn messages_carry_identity() {
        let err = BlockError::MissingDependency {
            block: "comments".into(),
            dependency: "blog".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("comments"));
        assert!(msg.contains("blog"));
    }
}
