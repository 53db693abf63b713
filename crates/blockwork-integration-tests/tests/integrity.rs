//! Hash recording at setup and verification at activation.

mod common;

use blockwork_core::BlockError;
use blockwork_registry::{BlockModules, HASH_FILE, ManagerOptions, STATE_DIR};
use common::{Project, RecordingHost};

const BLOG: &str = "[block]\nname = \"blog\"\nversion = 1\n";

fn hashed_project() -> (Project, std::path::PathBuf) {
    let project = Project::new();
    let dir = project.write_block("blog", BLOG);
    std::fs::write(dir.join("views.py"), "def index():\n    return 'ok'\n").unwrap();
    let options = ManagerOptions {
        save_hashes: true,
        verify_blocks: Some(true),
        ..ManagerOptions::default()
    };
    let (mut manager, _) = project.manager(options, BlockModules::default());
    manager.setup().unwrap();
    (project, dir)
}

#[test]
fn hash_record_is_json_keyed_by_directory() {
    let (project, _) = hashed_project();
    let raw = std::fs::read_to_string(project.root().join(STATE_DIR).join(HASH_FILE)).unwrap();
    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(record["blog"].as_str().unwrap().starts_with("blake3:"));
}

#[test]
fn unchanged_block_activates() {
    let (project, _) = hashed_project();
    let (mut manager, _) = project.manager(ManagerOptions::default(), BlockModules::default());
    let report = manager.activate(&mut RecordingHost::default()).unwrap();
    assert_eq!(report.mounted, vec!["blog".to_string()]);
}

#[test]
fn tampered_block_halts_activation() {
    let (project, dir) = hashed_project();
    std::fs::write(dir.join("views.py"), "import os\nos.system('curl evil')\n").unwrap();

    let options = ManagerOptions {
        allow_import_failure: true,
        ..ManagerOptions::default()
    };
    let (mut manager, _) = project.manager(options, BlockModules::default());
    let mut host = RecordingHost::default();
    let err = manager.activate(&mut host).unwrap_err();
    assert!(matches!(err, BlockError::IntegrityMismatch { ref block, .. } if block == "blog"));
}

#[test]
fn untracked_files_do_not_affect_the_digest() {
    let (project, dir) = hashed_project();
    std::fs::write(dir.join("notes.txt"), "scratch").unwrap();
    let (mut manager, _) = project.manager(ManagerOptions::default(), BlockModules::default());
    assert!(manager.activate(&mut RecordingHost::default()).is_ok());
}

#[test]
fn block_without_record_is_trusted() {
    let project = Project::new();
    project.write_block("blog", BLOG);
    let options = ManagerOptions {
        verify_blocks: Some(true),
        ..ManagerOptions::default()
    };
    let (mut manager, _) = project.manager(options, BlockModules::default());
    manager.setup().unwrap();
    let report = manager.activate(&mut RecordingHost::default()).unwrap();
    assert_eq!(report.mounted.len(), 1);
}

#[test]
fn verification_off_ignores_tampering() {
    let project = Project::new();
    let dir = project.write_block("blog", BLOG);
    let options = ManagerOptions {
        save_hashes: true,
        ..ManagerOptions::default()
    };
    let (mut manager, _) = project.manager(options, BlockModules::default());
    manager.setup().unwrap();
    std::fs::write(dir.join("extra.rs"), "fn main() {}").unwrap();

    let (mut manager, _) = project.manager(ManagerOptions::default(), BlockModules::default());
    assert!(manager.activate(&mut RecordingHost::default()).is_ok());
}
