//! Registry reconciliation across repeated `setup` runs.

mod common;

use blockwork_core::BlockError;
use blockwork_registry::{BlockModules, ManagerOptions, RegistryStore};
use common::{Project, RecordingInstaller};

#[test]
fn second_setup_is_a_no_op() {
    let project = Project::new();
    project.write_block("blog", "[block]\nname = \"blog\"\nversion = 2\nrequirements = [\"markdown\"]\nstart_hooks = [\"warm\"]\n");
    project.write_block("homepage", "[block]\nname = \"homepage\"\nversion = \"1.2\"\n");
    let options = ManagerOptions {
        allow_installs: true,
        ..ManagerOptions::default()
    };

    let (mut first, installer) = project.manager(options.clone(), BlockModules::default());
    let report = first.setup().unwrap();
    assert!(report.requires_restart);
    assert_eq!(installer.installed(), vec!["markdown".to_string()]);
    let before = project.registry_text();

    let (mut second, installer) = project.manager(options, BlockModules::default());
    let report = second.setup().unwrap();
    assert!(!report.requires_restart);
    assert!(report.new_installs.is_empty());
    assert!(installer.installed().is_empty());
    assert_eq!(project.registry_text(), before);
}

#[test]
fn edited_fields_are_not_overwritten() {
    let project = Project::new();
    let dir = project.write_block("blog", "[block]\nname = \"blog\"\nversion = 1\nload_order = 9\n");
    let (mut manager, _) = project.manager(ManagerOptions::default(), BlockModules::default());
    manager.setup().unwrap();

    std::fs::write(
        dir.join("block_config.toml"),
        "[block]\nname = \"blog\"\nversion = 1\nload_order = 1\napi_router = \"api.rs\"\n",
    )
    .unwrap();
    let (mut manager, _) = project.manager(ManagerOptions::default(), BlockModules::default());
    manager.setup().unwrap();

    let state = RegistryStore::new(project.root()).load().unwrap();
    let blog = &state.blocks["blog"];
    assert_eq!(blog.load_order(), 9);
    assert_eq!(blog.api_router(), Some("blocks.blog.api"));
}

#[test]
fn dependencies_resolve_in_load_order() {
    let project = Project::new();
    project.write_block("blog", "[block]\nname = \"blog\"\nversion = 1\nload_order = 2\n");
    project.write_block(
        "comments",
        "[block]\nname = \"comments\"\nversion = 1\nload_order = 5\ndependancies = [\"blog\"]\n",
    );
    let (mut manager, _) = project.manager(ManagerOptions::default(), BlockModules::default());
    let report = manager.setup().unwrap();
    assert_eq!(report.resolved, vec!["blog".to_string(), "comments".to_string()]);
}

#[test]
fn forward_dependency_is_fatal_even_when_tolerant() {
    let project = Project::new();
    project.write_block("aaa_first", "[block]\nname = \"aaa_first\"\nversion = 1\nload_order = 1\n");
    project.write_block("blog", "[block]\nname = \"blog\"\nversion = 1\nload_order = 9\n");
    project.write_block(
        "comments",
        "[block]\nname = \"comments\"\nversion = 1\nload_order = 3\ndependencies = [\"blog\"]\n",
    );
    let options = ManagerOptions {
        allow_import_failure: true,
        ..ManagerOptions::default()
    };
    let (mut manager, _) = project.manager(options, BlockModules::default());
    let err = manager.setup().unwrap_err();
    assert!(matches!(err, BlockError::MissingDependency { ref dependency, .. } if dependency == "blog"));

    // Blocks resolved before the failure were saved.
    let state = RegistryStore::new(project.root()).load().unwrap();
    assert!(state.blocks.contains_key("aaa_first"));
    assert!(!state.blocks.contains_key("comments"));
}

#[test]
fn install_failure_aborts_setup() {
    let project = Project::new();
    project.write_block("blog", "[block]\nname = \"blog\"\nversion = 1\nrequirements = [\"broken\"]\n");
    let options = ManagerOptions {
        allow_installs: true,
        allow_import_failure: true,
        ..ManagerOptions::default()
    };
    let installer = RecordingInstaller {
        fail_on: Some("broken".to_string()),
        ..RecordingInstaller::default()
    };
    let mut manager =
        blockwork_registry::BlockManager::new(project.root(), options, BlockModules::default()).with_installer(installer);
    let err = manager.setup().unwrap_err();
    assert!(matches!(err, BlockError::InstallFailure { .. }));
}

#[test]
fn missing_blocks_folder_is_reported() {
    let project = Project::new();
    let options = ManagerOptions {
        blocks_folder: "plugins".to_string(),
        ..ManagerOptions::default()
    };
    let (mut manager, _) = project.manager(options, BlockModules::default());
    let err = manager.setup().unwrap_err();
    assert!(matches!(err, BlockError::BlocksFolderMissing { .. }));
    assert!(!RegistryStore::new(project.root()).exists());
}
