//! ModeSwitchEngine - tears down one mode's modules and brings up another's
//!
//! A switch runs these phases in order:
//!
//! 1. look the mode up (the only step that can fail the switch)
//! 2. unload every module the previous mode loaded and is still running
//! 3. open the attribution window
//! 4. load the scanned directory, then the explicit load list
//! 5. force-unload the mode's explicit unload list
//! 6. close the attribution window
//! 7. apply settings and run commands
//! 8. commit the new mode name and notify observers
//!
//! Steps 2-7 are best-effort. Individual failures are logged and recorded in
//! the [`SwitchReport`]; nothing is rolled back or retried.

mod config;
mod ownership;

pub use config::{EngineConfig, PathStyle, ReloadPolicy, UnloadFailurePolicy};
pub use ownership::{ListenerBridge, SwitchPhase};

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use modegroup_host_api::{
    CommandSink, ListenerId, LoadedModule, ModuleHandle, ModuleRegistry, ModuleStatus,
    SettingsRegistry,
};

use crate::applier::SettingsApplier;
use crate::config::{ConfigStore, Mode};
use crate::error::{ConfigError, SwitchError};
use crate::events::{ModeObserver, ObserverList};
use crate::report::{LoadOutcome, ModuleLoad, ModuleUnload, SwitchReport, UnloadOutcome};
use crate::scanner::DirectoryScanner;
use ownership::SharedOwnership;

/// The host services an engine drives
#[derive(Clone)]
pub struct HostServices {
    pub modules: Arc<dyn ModuleRegistry>,
    pub settings: Arc<dyn SettingsRegistry>,
    pub commands: Arc<dyn CommandSink>,
}

impl HostServices {
    pub fn new(
        modules: Arc<dyn ModuleRegistry>,
        settings: Arc<dyn SettingsRegistry>,
        commands: Arc<dyn CommandSink>,
    ) -> Self {
        Self {
            modules,
            settings,
            commands,
        }
    }

    /// Use one object for all three roles
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: ModuleRegistry + SettingsRegistry + CommandSink + 'static,
    {
        Self {
            modules: host.clone(),
            settings: host.clone(),
            commands: host,
        }
    }
}

/// Owns the current mode and the modules it loaded
pub struct ModeSwitchEngine {
    store: ConfigStore,
    modules: Arc<dyn ModuleRegistry>,
    applier: SettingsApplier,
    scanner: DirectoryScanner,
    path_style: PathStyle,
    unload_failure: UnloadFailurePolicy,
    on_reload: ReloadPolicy,
    ownership: SharedOwnership,
    current: Option<String>,
    listener: Option<ListenerId>,
    observers: ObserverList,
}

impl ModeSwitchEngine {
    pub fn new(store: ConfigStore, host: HostServices, config: &EngineConfig) -> Self {
        let layout = config.layout();
        Self {
            store,
            modules: host.modules,
            applier: SettingsApplier::new(host.settings, host.commands),
            scanner: DirectoryScanner::new(layout.plugins_dir(), &config.module_extension),
            path_style: config.path_style,
            unload_failure: config.unload_failure,
            on_reload: config.on_reload,
            ownership: SharedOwnership::new(),
            current: None,
            listener: None,
            observers: ObserverList::new(),
        }
    }

    /// Register for module start/stop notifications. Idempotent.
    pub fn start(&mut self) {
        if self.listener.is_some() {
            return;
        }
        let bridge = Arc::new(ListenerBridge::new(self.ownership.clone()));
        self.listener = Some(self.modules.add_listener(bridge));
        tracing::info!(modes = self.store.table().len(), "Mode group manager started");
    }

    /// Unload owned modules, forget the current mode and stop listening
    pub fn shutdown(&mut self) -> Vec<ModuleUnload> {
        let (unloaded, _) = self.unload_owned();
        self.current = None;
        if let Some(id) = self.listener.take() {
            self.modules.remove_listener(id);
        }
        tracing::info!("Mode group manager stopped");
        unloaded
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ModeObserver>) {
        self.observers.subscribe(observer);
    }

    /// Switch to `name`
    ///
    /// Fails only if the mode does not exist, in which case nothing is
    /// touched. Otherwise the switch runs to completion and the report lists
    /// what each entry did. Switches cannot overlap: this takes `&mut self`
    /// and the attribution window closes before it returns or unwinds.
    pub fn switch_to(&mut self, name: &str) -> Result<SwitchReport, SwitchError> {
        let table = self.store.table();
        let Some(mode) = table.get(name) else {
            tracing::error!(mode = %name, "Mode group not found");
            return Err(SwitchError::ModeNotFound(name.to_string()));
        };

        tracing::info!(mode = %name, previous = ?self.current, "Switching mode group");
        let mut report = SwitchReport::new(name, self.current.clone());

        let (unloaded, still_running) = self.unload_owned();
        report.unloaded = unloaded;

        {
            let _window = self.ownership.begin_switch();
            report.loaded = self.load_phase(mode, &still_running);
            report.force_unloaded = self.force_unload(&mode.unload);
        }

        report.applied = self.applier.apply(mode);

        let previous = self.current.replace(name.to_string());
        tracing::info!(
            mode = %name,
            loaded = report.loaded_count(),
            failures = report.failures().len(),
            "Switched to mode group"
        );
        self.observers.notify(previous.as_deref(), name);

        Ok(report)
    }

    /// The ordered load list a switch to `name` would use
    pub fn plan(&self, name: &str) -> Result<Vec<String>, SwitchError> {
        self.store
            .lookup(name)
            .map(|mode| self.load_list(mode))
            .ok_or_else(|| SwitchError::ModeNotFound(name.to_string()))
    }

    /// Re-read the mode file
    ///
    /// With [`ReloadPolicy::KeepCurrent`] the current mode and its modules
    /// survive the reload. With [`ReloadPolicy::UnloadCurrent`] they are torn
    /// down first, whether or not the new file parses.
    pub fn reload_config(&mut self) -> Result<usize, ConfigError> {
        if self.on_reload == ReloadPolicy::UnloadCurrent && self.current.is_some() {
            let (unloaded, _) = self.unload_owned();
            let previous = self.current.take();
            tracing::info!(
                mode = ?previous,
                unloaded = unloaded.len(),
                "Unloaded current mode group before reload"
            );
        }

        let count = self.store.reload()?;
        if let Some(current) = &self.current
            && !self.store.table().contains(current)
        {
            tracing::warn!(mode = %current, "Current mode group no longer exists in configuration");
        }
        Ok(count)
    }

    pub fn list_modes(&self) -> Vec<String> {
        self.store.mode_names()
    }

    pub fn current_mode(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn mode(&self, name: &str) -> Option<&Mode> {
        self.store.lookup(name)
    }

    /// Handles the current mode owns
    pub fn active_modules(&self) -> Vec<ModuleHandle> {
        self.ownership.lock().active.clone()
    }

    pub fn is_switching(&self) -> bool {
        self.ownership.lock().phase == SwitchPhase::Switching
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.store
    }

    /// Scanned paths followed by the explicit load list, resolved
    fn load_list(&self, mode: &Mode) -> Vec<String> {
        let scanned = mode
            .scan_directory
            .as_deref()
            .map(|dir| self.scanner.scan(dir))
            .unwrap_or_default();

        scanned
            .iter()
            .chain(&mode.load)
            .map(|path| self.resolve(path))
            .collect()
    }

    fn resolve(&self, path: &str) -> String {
        match self.path_style {
            PathStyle::Relative => path.to_string(),
            PathStyle::Absolute if Path::new(path).is_absolute() => path.to_string(),
            PathStyle::Absolute => self
                .scanner
                .plugins_root()
                .join(path)
                .to_string_lossy()
                .into_owned(),
        }
    }

    /// Unload every owned module that is still running and clear tracking.
    ///
    /// Returns the outcomes and the paths of modules that refused to unload.
    fn unload_owned(&mut self) -> (Vec<ModuleUnload>, HashSet<String>) {
        let owned = std::mem::take(&mut self.ownership.lock().active);
        let mut outcomes = Vec::with_capacity(owned.len());
        let mut still_running = HashSet::new();
        if owned.is_empty() {
            return (outcomes, still_running);
        }

        let paths: HashMap<ModuleHandle, String> = self
            .modules
            .list_all()
            .into_iter()
            .map(|entry| (entry.handle, entry.path))
            .collect();

        for handle in owned {
            let target = paths
                .get(&handle)
                .cloned()
                .unwrap_or_else(|| handle.to_string());

            let outcome = match self.modules.status(handle) {
                Some(status) if status.is_running() => match self.modules.unload(handle) {
                    Ok(()) => {
                        tracing::info!(plugin = %target, "Unloaded plugin");
                        UnloadOutcome::Unloaded
                    }
                    Err(e) => {
                        tracing::error!(plugin = %target, error = %e, "Failed to unload plugin");
                        still_running.insert(target.clone());
                        UnloadOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                },
                status => {
                    tracing::debug!(plugin = %target, ?status, "Plugin not running, leaving it");
                    UnloadOutcome::NotRunning { status }
                }
            };

            outcomes.push(ModuleUnload {
                target,
                handle: Some(handle),
                outcome,
            });
        }

        (outcomes, still_running)
    }

    fn load_phase(&self, mode: &Mode, still_running: &HashSet<String>) -> Vec<ModuleLoad> {
        self.load_list(mode)
            .into_iter()
            .map(|path| {
                let outcome = if self.unload_failure == UnloadFailurePolicy::SkipStillRunning
                    && still_running.contains(&path)
                {
                    tracing::warn!(plugin = %path, "Previous instance still running, skipping load");
                    LoadOutcome::Skipped {
                        reason: "previous instance failed to unload".to_string(),
                    }
                } else {
                    self.load_one(&path)
                };
                ModuleLoad { path, outcome }
            })
            .collect()
    }

    fn load_one(&self, path: &str) -> LoadOutcome {
        match self.modules.load(path, false) {
            Ok(LoadedModule {
                handle,
                already_loaded: true,
            }) => {
                tracing::info!(plugin = %path, %handle, "Plugin already loaded, not taking ownership");
                LoadOutcome::AlreadyLoaded { handle }
            }
            Ok(LoadedModule { handle, .. }) => {
                // Queried before locking; the bridge may already have tracked
                // or untracked it from inside `load`
                let running = self.modules.status(handle).is_some_and(ModuleStatus::is_running);
                if running {
                    self.ownership.lock().track(handle);
                    tracing::info!(plugin = %path, %handle, "Loaded plugin");
                } else {
                    self.ownership.lock().untrack(handle);
                    tracing::warn!(plugin = %path, %handle, "Plugin stopped right after loading, not tracking");
                }
                LoadOutcome::Loaded { handle }
            }
            Err(e) => {
                tracing::error!(plugin = %path, error = %e, "Failed to load plugin");
                LoadOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    fn force_unload(&self, paths: &[String]) -> Vec<ModuleUnload> {
        paths
            .iter()
            .map(|path| {
                let target = self.resolve(path);
                let (handle, outcome) = match self.modules.find_by_path(&target) {
                    None => {
                        tracing::debug!(plugin = %target, "Plugin to unload is not loaded");
                        (None, UnloadOutcome::NotFound)
                    }
                    Some(entry) if !entry.status.is_running() => (
                        Some(entry.handle),
                        UnloadOutcome::NotRunning {
                            status: Some(entry.status),
                        },
                    ),
                    Some(entry) => match self.modules.unload(entry.handle) {
                        Ok(()) => {
                            self.ownership.lock().untrack(entry.handle);
                            tracing::info!(plugin = %target, "Unloaded plugin");
                            (Some(entry.handle), UnloadOutcome::Unloaded)
                        }
                        Err(e) => {
                            tracing::error!(plugin = %target, error = %e, "Failed to unload plugin");
                            (
                                Some(entry.handle),
                                UnloadOutcome::Failed {
                                    error: e.to_string(),
                                },
                            )
                        }
                    },
                };
                ModuleUnload {
                    target,
                    handle,
                    outcome,
                }
            })
            .collect()
    }
}
