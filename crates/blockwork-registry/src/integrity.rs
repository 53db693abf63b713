//! Block directory integrity checks.
//!
//! A block's digest is a blake3 hash over every tracked file in its directory,
//! visited in sorted order. Each file contributes its relative path and its
//! content, so renames and edits both change the digest. Digests are stored
//! in `block_hashes.json` keyed by block directory name, as `blake3:<hex>`.
//!
//! Verification trusts on first use: a block with no recorded digest passes.

use std::path::Path;

use blockwork_core::{BlockError, BlockResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::fs::atomic_write;

/// File extensions covered by the digest: source, manifest, template, script.
pub const TRACKED_EXTENSIONS: &[&str] = &["rs", "py", "toml", "html", "js"];

/// Compute the digest of a block directory.
///
/// # Errors
///
/// Returns [`BlockError::Io`] if the directory or a tracked file cannot be read.
pub fn compute_digest(block_dir: &Path) -> BlockResult<String> {
    let mut hasher = blake3::Hasher::new();
    let walker = WalkDir::new(block_dir).sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(block_dir).to_path_buf();
            BlockError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() || !is_tracked(entry.path()) {
            continue;
        }

        let relative = entry.path().strip_prefix(block_dir).unwrap_or(entry.path());
        let bytes = std::fs::read(entry.path()).map_err(|e| BlockError::io(entry.path(), e))?;

        hasher.update(relative.to_string_lossy().replace('\\', "/").as_bytes());
        hasher.update(&[0]);
        hasher.update(&bytes);
    }

    Ok(format!("blake3:{}", hasher.finalize().to_hex()))
}

fn is_tracked(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TRACKED_EXTENSIONS.contains(&e))
}

fn record_key(block_dir: &Path) -> String {
    block_dir
        .file_name()
        .map_or_else(|| block_dir.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Recorded digests by block directory name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashRecord {
    digests: IndexMap<String, String>,
}

impl HashRecord {
    /// Load the record, or an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> BlockResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| BlockError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(BlockError::io(path, e)),
        }
    }

    /// Write the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    pub fn save(&self, path: &Path) -> BlockResult<()> {
        let body = serde_json::to_string_pretty(self).map_err(|e| BlockError::Serialize {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        atomic_write(path, &body)?;
        debug!(path = %path.display(), blocks = self.digests.len(), "Saved block hashes");
        Ok(())
    }

    /// Compute and store the digest of a block directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be hashed.
    pub fn record(&mut self, block_dir: &Path) -> BlockResult<String> {
        let digest = compute_digest(block_dir)?;
        self.digests.insert(record_key(block_dir), digest.clone());
        Ok(digest)
    }

    /// The stored digest for a block directory name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.digests.get(key).map(String::as_str)
    }

    /// Number of recorded blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Whether nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

/// Outcome of verifying one block directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Verification is turned off.
    Disabled,
    /// No digest on record; trusted.
    Untracked,
    /// Digest matches the record.
    Match,
    /// Digest differs from the record.
    Mismatch {
        /// Recorded digest.
        expected: String,
        /// Digest computed now.
        actual: String,
    },
}

impl Verification {
    /// Whether activation may proceed.
    #[must_use]
    pub fn passed(&self) -> bool {
        !matches!(self, Self::Mismatch { .. })
    }
}

/// Checks block directories against a [`HashRecord`].
#[derive(Debug, Clone, Default)]
pub struct IntegrityVerifier {
    enabled: bool,
    record: HashRecord,
}

impl IntegrityVerifier {
    /// A verifier over `record`; when `enabled` is false every check passes.
    #[must_use]
    pub fn new(enabled: bool, record: HashRecord) -> Self {
        Self { enabled, record }
    }

    /// Verify a block directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorded block's directory cannot be hashed.
    pub fn check(&self, block_dir: &Path) -> BlockResult<Verification> {
        if !self.enabled {
            return Ok(Verification::Disabled);
        }
        let key = record_key(block_dir);
        let Some(expected) = self.record.get(&key) else {
            debug!(block = %key, "No recorded hash, trusting block");
            return Ok(Verification::Untracked);
        };

        let actual = compute_digest(block_dir)?;
        if actual == expected {
            Ok(Verification::Match)
        } else {
            warn!(block = %key, %expected, %actual, "Block hash mismatch");
            Ok(Verification::Mismatch {
                expected: expected.to_string(),
                actual,
            })
        }
    }

    /// Whether a block directory passes verification.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorded block's directory cannot be hashed.
    pub fn verify(&self, block_dir: &Path) -> BlockResult<bool> {
        self.check(block_dir).map(|v| v.passed())
    }

    /// Fail with [`BlockError::IntegrityMismatch`] unless the directory passes.
    ///
    /// # Errors
    ///
    /// Returns the mismatch, or an error hashing the directory.
    pub fn ensure(&self, block_dir: &Path) -> BlockResult<()> {
        match self.check(block_dir)? {
            Verification::Mismatch { expected, actual } => Err(BlockError::IntegrityMismatch {
                block: record_key(block_dir),
                expected,
                actual,
            }),
            _ => Ok(()),
        }
    }
}
