//! Hook registration across setups and execution order during activation.

mod common;

use blockwork_hooks::{HookCatalog, HookPhase};
use blockwork_registry::{BlockModules, ManagerOptions, RegistryStore};
use common::{Project, RecordingHost, event_log};

const BLOG: &str = r#"
[block]
name = "blog"
version = 1
load_order = 2
setup_hooks = ["migrate"]
start_hooks = ["warm"]
preload_hooks = ["hooks.rs:before"]
postload_hooks = ["hooks.rs:after"]
"#;

const SHOP: &str = "[block]\nname = \"shop\"\nversion = 1\nload_order = 5\n";

fn modules(log: &std::sync::Arc<std::sync::Mutex<Vec<String>>>) -> BlockModules {
    let mut hooks = HookCatalog::default();
    for (module, function) in [
        ("blocks.blog", "migrate"),
        ("blocks.blog", "warm"),
        ("blocks.blog.hooks", "before"),
        ("blocks.blog.hooks", "after"),
    ] {
        let log = log.clone();
        hooks.register(module, function, move |ctx| {
            let block = ctx.block.and_then(|b| b.name()).unwrap_or("-").to_string();
            log.lock().unwrap().push(format!("{}:{function}:{block}", ctx.phase));
        });
    }
    BlockModules {
        hooks,
        ..BlockModules::default()
    }
}

#[test]
fn hooks_run_in_phase_order() {
    let project = Project::new();
    project.write_block("blog", BLOG);
    project.write_block("shop", SHOP);
    let log = event_log();

    let (mut manager, _) = project.manager(ManagerOptions::default(), modules(&log));
    manager.setup().unwrap();
    manager.activate(&mut RecordingHost::default()).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "setup:migrate:-",
            "start:warm:-",
            "blockPreload:before:blog",
            "blockPostload:after:blog",
            "blockPreload:before:shop",
            "blockPostload:after:shop",
        ]
    );
}

#[test]
fn repeated_setup_does_not_duplicate_hooks() {
    let project = Project::new();
    project.write_block("blog", BLOG);
    let log = event_log();

    for _ in 0..3 {
        let (mut manager, _) = project.manager(ManagerOptions::default(), modules(&log));
        manager.setup().unwrap();
    }
    let state = RegistryStore::new(project.root()).load().unwrap();
    assert_eq!(state.hooks.group(HookPhase::Start)["blocks.blog"], vec!["warm".to_string()]);
    assert_eq!(state.hooks.group(HookPhase::BlockPreload)["blocks.blog.hooks"], vec!["before".to_string()]);
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
fn unregistered_hook_is_skipped() {
    let project = Project::new();
    project.write_block("blog", BLOG);
    let log = event_log();
    let (mut manager, _) = project.manager(ManagerOptions::default(), BlockModules::default());
    manager.setup().unwrap();
    manager.activate(&mut RecordingHost::default()).unwrap();
    assert!(log.lock().unwrap().is_empty());
}
