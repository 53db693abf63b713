//! Shared fixtures for blockwork integration tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use blockwork_core::{BlockError, BlockResult, MANIFEST_FILE_NAME};
use blockwork_registry::{
    BlockManager, BlockModules, HostApp, ManagerOptions, PackageInstaller, RouteGroup,
};
use tempfile::TempDir;

/// A working directory with a `blocks/` folder.
///
/// The tempdir is cleaned up when the project is dropped.
#[allow(dead_code)]
pub struct Project {
    dir: TempDir,
}

#[allow(dead_code)]
impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create tempdir");
        std::fs::create_dir(dir.path().join("blocks")).expect("failed to create blocks folder");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `blocks/<dir>/block_config.toml` with `manifest` as its body.
    pub fn write_block(&self, dir: &str, manifest: &str) -> PathBuf {
        write_block(&self.root().join("blocks"), dir, manifest)
    }

    /// A manager with a recording installer.
    pub fn manager(&self, options: ManagerOptions, modules: BlockModules) -> (BlockManager, RecordingInstaller) {
        let installer = RecordingInstaller::default();
        let manager = BlockManager::new(self.root(), options, modules).with_installer(installer.clone());
        (manager, installer)
    }

    pub fn registry_text(&self) -> String {
        std::fs::read_to_string(self.root().join("blockmanager").join("block_infos.toml"))
            .expect("registry document missing")
    }
}

/// Write a block directory containing one manifest.
pub fn write_block(blocks_dir: &Path, dir: &str, manifest: &str) -> PathBuf {
    let block_dir = blocks_dir.join(dir);
    std::fs::create_dir_all(&block_dir).expect("failed to create block dir");
    std::fs::write(block_dir.join(MANIFEST_FILE_NAME), manifest).expect("failed to write manifest");
    block_dir
}

/// Host that records every mount.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct RecordingHost {
    /// `(prefix, group name)` in mount order.
    pub groups: Vec<(String, String)>,
    /// `(url prefix, directory, name)` in mount order.
    pub statics: Vec<(String, PathBuf, String)>,
}

impl HostApp for RecordingHost {
    fn has_route_group(&self, name: &str) -> bool {
        self.groups.iter().any(|(_, g)| g == name)
    }

    fn mount_route_group(&mut self, prefix: &str, group: RouteGroup) {
        self.groups.push((prefix.to_string(), group.name));
    }

    fn mount_static_directory(&mut self, url_prefix: &str, path: &Path, name: &str) {
        self.statics
            .push((url_prefix.to_string(), path.to_path_buf(), name.to_string()));
    }
}

/// Installer that records requirements instead of running a command.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
pub struct RecordingInstaller {
    pub installed: Arc<Mutex<Vec<String>>>,
    pub fail_on: Option<String>,
}

#[allow(dead_code)]
impl RecordingInstaller {
    pub fn installed(&self) -> Vec<String> {
        self.installed.lock().expect("poisoned").clone()
    }
}

impl PackageInstaller for RecordingInstaller {
    fn install(&self, requirement: &str) -> BlockResult<()> {
        if self.fail_on.as_deref() == Some(requirement) {
            return Err(BlockError::InstallFailure {
                requirement: requirement.to_string(),
                message: "exit status: 1".to_string(),
            });
        }
        self.installed.lock().expect("poisoned").push(requirement.to_string());
        Ok(())
    }
}

/// Shared event log for hook callables.
#[allow(dead_code)]
pub fn event_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}
