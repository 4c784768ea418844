//! End-to-end switching tests against the in-memory host
//!
//! These exercise the full path: mode file on disk, directory scan, module
//! loads with host callbacks, settings and commands.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use modegroup_core::host::MemoryHost;
use modegroup_core::{
    ConfigError, ConfigStore, EngineConfig, HostServices, LoadOutcome, ModeSwitchEngine,
    SwitchError,
};
use modegroup_host_api::{
    HostError, ListenerId, LoadedModule, ModuleEntry, ModuleHandle, ModuleListener,
    ModuleRegistry, ModuleStatus,
};
use tempfile::TempDir;

const TWO_MODES: &str = r#"
"ModeGroups"
{
    "A"
    {
        "plugin_directory" "a"
        "cvars"
        {
            "x" "1"
        }
    }
    "B"
    {
        "load"
        {
            "plugin" "b.mod"
        }
    }
}
"#;

const COMBAT: &str = r#"
"ModeGroups"
{
    "combat"
    {
        "plugin_directory" "combat"
        "cvars"
        {
            "friendlyfire" "0"
        }
        "commands"
        {
            "mp_restartgame" "1"
        }
    }
    "casual"
    {
        "load"
        {
            "plugin" "casual/fun.mod"
        }
    }
}
"#;

/// Host root with a mode file and the given module files under `plugins/`
fn host_root(config: &str, modules: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("configs")).unwrap();
    fs::write(dir.path().join("configs/modegroup.cfg"), config).unwrap();
    for module in modules {
        let path = dir.path().join("plugins").join(module);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }
    dir
}

fn engine_config(root: &Path) -> EngineConfig {
    EngineConfig {
        host_root: Some(root.to_path_buf()),
        module_extension: "mod".to_string(),
        ..Default::default()
    }
}

fn engine_for(root: &Path, host: Arc<MemoryHost>) -> ModeSwitchEngine {
    let config = engine_config(root);
    let store = ConfigStore::load(config.layout().mode_config(), &config.root_section).unwrap();
    let mut engine = ModeSwitchEngine::new(store, HostServices::from_host(host), &config);
    engine.start();
    engine
}

/// Paths of the modules the engine currently owns
fn active_paths(engine: &ModeSwitchEngine, host: &MemoryHost) -> BTreeSet<String> {
    let active = engine.active_modules();
    host.list_all()
        .into_iter()
        .filter(|entry| active.contains(&entry.handle))
        .map(|entry| entry.path)
        .collect()
}

#[test]
fn parsed_table_matches_file_verbatim() {
    let table = ConfigStore::parse_str(TWO_MODES, "ModeGroups").unwrap();

    assert_eq!(table.len(), 2);
    let a = table.get("A").unwrap();
    assert_eq!(a.scan_directory.as_deref(), Some("a"));
    assert_eq!(a.settings.get("x").map(String::as_str), Some("1"));
    assert!(a.load.is_empty());

    let b = table.get("B").unwrap();
    assert_eq!(b.scan_directory, None);
    assert_eq!(b.load, vec!["b.mod"]);
    assert!(b.settings.is_empty());
}

#[test]
fn malformed_reload_keeps_previous_table() {
    let root = host_root(TWO_MODES, &[]);
    let mut engine = engine_for(root.path(), Arc::new(MemoryHost::new()));

    fs::write(
        root.path().join("configs/modegroup.cfg"),
        "\"ModeGroups\"\n{\n    \"C\"\n    {\n",
    )
    .unwrap();

    let err = engine.reload_config().unwrap_err();
    assert!(matches!(err, ConfigError::Syntax { .. }));
    assert_eq!(engine.list_modes(), vec!["A", "B"]);
}

#[test]
fn missing_mode_changes_nothing() {
    let root = host_root(COMBAT, &["casual/fun.mod"]);
    let host = Arc::new(MemoryHost::new());
    let mut engine = engine_for(root.path(), host.clone());
    engine.switch_to("casual").unwrap();
    let before = engine.active_modules();

    let err = engine.switch_to("missing").unwrap_err();

    assert_eq!(err, SwitchError::ModeNotFound("missing".into()));
    assert_eq!(engine.current_mode(), Some("casual"));
    assert_eq!(engine.active_modules(), before);
    assert_eq!(host.loaded_paths(), vec!["casual/fun.mod"]);
}

#[test]
fn loads_outside_a_switch_are_never_owned() {
    let root = host_root(COMBAT, &["casual/fun.mod"]);
    let host = Arc::new(MemoryHost::new());
    let mut engine = engine_for(root.path(), host.clone());

    host.load("admin/tools.mod", false).unwrap();
    assert!(engine.active_modules().is_empty());

    engine.switch_to("casual").unwrap();
    host.load("admin/other.mod", false).unwrap();

    assert_eq!(
        active_paths(&engine, &host),
        BTreeSet::from(["casual/fun.mod".to_string()])
    );

    engine.switch_to("combat").unwrap();
    assert!(host.is_loaded("admin/tools.mod"));
    assert!(host.is_loaded("admin/other.mod"));
}

/// Registry that pulls in a dependency while loading its parent, firing the
/// dependency's start callback from inside `load`
struct DependencyLoader {
    inner: Arc<MemoryHost>,
    parent: &'static str,
    dependency: &'static str,
}

impl ModuleRegistry for DependencyLoader {
    fn load(&self, path: &str, persistent: bool) -> Result<LoadedModule, HostError> {
        if path == self.parent {
            self.inner.load(self.dependency, persistent)?;
        }
        self.inner.load(path, persistent)
    }

    fn unload(&self, handle: ModuleHandle) -> Result<(), HostError> {
        self.inner.unload(handle)
    }

    fn status(&self, handle: ModuleHandle) -> Option<ModuleStatus> {
        self.inner.status(handle)
    }

    fn list_all(&self) -> Vec<ModuleEntry> {
        self.inner.list_all()
    }

    fn add_listener(&self, listener: Arc<dyn ModuleListener>) -> ListenerId {
        self.inner.add_listener(listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner.remove_listener(id)
    }
}

#[test]
fn modules_started_during_a_switch_are_owned() {
    let root = host_root(COMBAT, &["casual/fun.mod"]);
    let host = Arc::new(MemoryHost::new());
    let loader = Arc::new(DependencyLoader {
        inner: host.clone(),
        parent: "casual/fun.mod",
        dependency: "lib/shared.mod",
    });
    let config = engine_config(root.path());
    let store = ConfigStore::load(config.layout().mode_config(), &config.root_section).unwrap();
    let services = HostServices::new(loader, host.clone(), host.clone());
    let mut engine = ModeSwitchEngine::new(store, services, &config);
    engine.start();

    engine.switch_to("casual").unwrap();
    assert_eq!(
        active_paths(&engine, &host),
        BTreeSet::from(["casual/fun.mod".to_string(), "lib/shared.mod".to_string()])
    );

    engine.switch_to("combat").unwrap();
    assert!(!host.is_loaded("lib/shared.mod"));
}

#[test]
fn switching_twice_reloads_the_same_set() {
    let root = host_root(COMBAT, &["combat/a.mod", "combat/sub/b.mod"]);
    let host = Arc::new(MemoryHost::new().with_open_settings());
    let mut engine = engine_for(root.path(), host.clone());

    engine.switch_to("combat").unwrap();
    let first = active_paths(&engine, &host);
    let report = engine.switch_to("combat").unwrap();
    let second = active_paths(&engine, &host);

    assert_eq!(first, second);
    assert_eq!(report.unloaded.len(), 2);
    assert_eq!(report.loaded_count(), 2);
    assert_eq!(host.load_attempts().len(), 4);
}

#[test]
fn failed_load_does_not_stop_the_rest() {
    let root = host_root(
        r#""ModeGroups" { "m" { "load" { "1" "one.mod" "2" "two.mod" "3" "three.mod" } } }"#,
        &[],
    );
    let host = Arc::new(MemoryHost::new());
    host.fail_load("two.mod", "Unable to open file");
    let mut engine = engine_for(root.path(), host.clone());

    let report = engine.switch_to("m").unwrap();

    assert_eq!(host.load_attempts(), vec!["one.mod", "two.mod", "three.mod"]);
    assert!(matches!(report.loaded[1].outcome, LoadOutcome::Failed { .. }));
    assert_eq!(
        report.failures(),
        vec!["load two.mod: Failed to load two.mod: Unable to open file"]
    );
    assert_eq!(
        active_paths(&engine, &host),
        BTreeSet::from(["one.mod".to_string(), "three.mod".to_string()])
    );
    assert_eq!(engine.current_mode(), Some("m"));
}

#[test]
fn scanned_modules_load_before_explicit_ones() {
    let root = host_root(
        r#""ModeGroups" { "m" { "plugin_directory" "extra" "load" { "p" "z.mod" "p" "a.mod" } } }"#,
        &["extra/one.mod", "extra/deep/two.mod", "extra/notes.txt"],
    );
    let engine = engine_for(root.path(), Arc::new(MemoryHost::new()));

    let plan = engine.plan("m").unwrap();

    assert_eq!(plan.len(), 4);
    let scanned: BTreeSet<&str> = plan[..2].iter().map(String::as_str).collect();
    assert_eq!(
        scanned,
        BTreeSet::from(["extra/one.mod", "extra/deep/two.mod"])
    );
    assert_eq!(plan[2..].to_vec(), vec!["z.mod", "a.mod"]);
}

#[test]
fn combat_scenario() {
    let root = host_root(COMBAT, &["casual/fun.mod", "combat/a.mod", "combat/sub/b.mod"]);
    let host = Arc::new(
        MemoryHost::new()
            .with_setting("friendlyfire", "1")
            .with_files_root(root.path().join("plugins")),
    );
    let mut engine = engine_for(root.path(), host.clone());
    engine.switch_to("casual").unwrap();

    let report = engine.switch_to("combat").unwrap();

    assert!(report.is_clean());
    assert_eq!(report.previous.as_deref(), Some("casual"));
    assert!(!host.is_loaded("casual/fun.mod"));
    assert_eq!(
        active_paths(&engine, &host),
        BTreeSet::from(["combat/a.mod".to_string(), "combat/sub/b.mod".to_string()])
    );
    assert_eq!(host.setting("friendlyfire").as_deref(), Some("0"));
    assert_eq!(host.submitted(), vec!["mp_restartgame 1"]);
    assert_eq!(engine.current_mode(), Some("combat"));
}

#[test]
fn combat_scenario_without_the_setting() {
    let root = host_root(COMBAT, &["combat/a.mod", "combat/sub/b.mod"]);
    let host = Arc::new(MemoryHost::new());
    let mut engine = engine_for(root.path(), host.clone());

    let report = engine.switch_to("combat").unwrap();

    assert_eq!(report.failures(), vec!["setting friendlyfire: not found"]);
    assert_eq!(host.submitted(), vec!["mp_restartgame 1"]);
    assert_eq!(engine.current_mode(), Some("combat"));
}
