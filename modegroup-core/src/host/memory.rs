//! In-memory host for tests and dry runs
//!
//! MemoryHost plays all three host roles: module loader, settings registry
//! and command sink. Load and unload failures can be scripted per path, and
//! listeners are notified synchronously from inside `load`/`unload`, the way a
//! real host fires its plugin callbacks.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use modegroup_host_api::{
    CommandSink, HostError, ListenerId, LoadedModule, ModuleEntry, ModuleHandle, ModuleListener,
    ModuleRegistry, ModuleStatus, SettingId, SettingsRegistry,
};

#[derive(Default)]
struct HostState {
    next_handle: u64,
    next_id: u64,
    modules: Vec<ModuleEntry>,
    load_failures: HashMap<String, String>,
    unload_failures: HashSet<String>,
    /// When set, a load fails unless the file exists below this directory
    files_root: Option<PathBuf>,
    settings: BTreeMap<String, (SettingId, String)>,
    read_only: HashSet<String>,
    /// Unknown setting names are created on first lookup
    open_settings: bool,
    submitted: Vec<String>,
    load_attempts: Vec<String>,
    listeners: Vec<(ListenerId, Arc<dyn ModuleListener>)>,
}

impl HostState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Scriptable in-memory implementation of every host trait
#[derive(Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known setting with an initial value
    pub fn with_setting(mut self, name: &str, value: &str) -> Self {
        let state = self.state_mut();
        let id = SettingId(state.next_id());
        state
            .settings
            .insert(name.to_string(), (id, value.to_string()));
        self
    }

    /// Make an existing setting reject writes
    pub fn with_read_only_setting(mut self, name: &str) -> Self {
        self.state_mut().read_only.insert(name.to_string());
        self
    }

    /// Accept any setting name, creating it on first lookup
    pub fn with_open_settings(mut self) -> Self {
        self.state_mut().open_settings = true;
        self
    }

    /// Only allow loading files that exist below `root`
    pub fn with_files_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.state_mut().files_root = Some(root.into());
        self
    }

    /// Make every future load of `path` fail with `message`
    pub fn fail_load(&self, path: &str, message: &str) {
        self.state()
            .load_failures
            .insert(path.to_string(), message.to_string());
    }

    /// Make every future unload of the module loaded from `path` fail
    pub fn fail_unload(&self, path: &str) {
        self.state().unload_failures.insert(path.to_string());
    }

    /// Override the status of a loaded module (e.g. pause it)
    pub fn set_status(&self, handle: ModuleHandle, status: ModuleStatus) {
        if let Some(entry) = self
            .state()
            .modules
            .iter_mut()
            .find(|m| m.handle == handle)
        {
            entry.status = status;
        }
    }

    /// Current value of a setting
    pub fn setting(&self, name: &str) -> Option<String> {
        self.state()
            .settings
            .get(name)
            .map(|(_, value)| value.clone())
    }

    /// Commands submitted so far, in order
    pub fn submitted(&self) -> Vec<String> {
        self.state().submitted.clone()
    }

    /// Every path passed to `load`, in order
    pub fn load_attempts(&self) -> Vec<String> {
        self.state().load_attempts.clone()
    }

    /// Paths of modules currently loaded
    pub fn loaded_paths(&self) -> Vec<String> {
        self.state()
            .modules
            .iter()
            .map(|m| m.path.clone())
            .collect()
    }

    pub fn is_loaded(&self, path: &str) -> bool {
        self.state().modules.iter().any(|m| m.path == path)
    }

    pub fn handle_of(&self, path: &str) -> Option<ModuleHandle> {
        self.state()
            .modules
            .iter()
            .find(|m| m.path == path)
            .map(|m| m.handle)
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut HostState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> Vec<Arc<dyn ModuleListener>> {
        self.state()
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect()
    }

    fn file_exists(root: &Path, path: &str) -> bool {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.is_file()
        } else {
            root.join(candidate).is_file()
        }
    }
}

impl ModuleRegistry for MemoryHost {
    fn load(&self, path: &str, _persistent: bool) -> Result<LoadedModule, HostError> {
        let handle = {
            let mut state = self.state();
            state.load_attempts.push(path.to_string());

            if let Some(message) = state.load_failures.get(path) {
                return Err(HostError::load(path, message.clone()));
            }

            if let Some(root) = &state.files_root
                && !Self::file_exists(root, path)
            {
                return Err(HostError::load(path, "Unable to open file"));
            }

            if let Some(existing) = state.modules.iter().find(|m| m.path == path) {
                return Ok(LoadedModule {
                    handle: existing.handle,
                    already_loaded: true,
                });
            }

            state.next_handle += 1;
            let handle = ModuleHandle(state.next_handle);
            state.modules.push(ModuleEntry {
                handle,
                path: path.to_string(),
                status: ModuleStatus::Running,
            });
            handle
        };

        // Lock released: listeners may call back into the host
        for listener in self.listeners() {
            listener.on_module_started(handle);
        }

        Ok(LoadedModule {
            handle,
            already_loaded: false,
        })
    }

    fn unload(&self, handle: ModuleHandle) -> Result<(), HostError> {
        {
            let mut state = self.state();
            let Some(index) = state.modules.iter().position(|m| m.handle == handle) else {
                return Err(HostError::NotFound(handle.to_string()));
            };
            let path = &state.modules[index].path;
            if state.unload_failures.contains(path) {
                return Err(HostError::unload(path.clone(), "plugin refused to unload"));
            }
            state.modules.remove(index);
        }

        for listener in self.listeners() {
            listener.on_module_stopped(handle);
        }
        Ok(())
    }

    fn status(&self, handle: ModuleHandle) -> Option<ModuleStatus> {
        self.state()
            .modules
            .iter()
            .find(|m| m.handle == handle)
            .map(|m| m.status)
    }

    fn list_all(&self) -> Vec<ModuleEntry> {
        self.state().modules.clone()
    }

    fn add_listener(&self, listener: Arc<dyn ModuleListener>) -> ListenerId {
        let mut state = self.state();
        let id = ListenerId(state.next_id());
        state.listeners.push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.state().listeners.retain(|(lid, _)| *lid != id);
    }
}

impl SettingsRegistry for MemoryHost {
    fn find(&self, name: &str) -> Option<SettingId> {
        let mut state = self.state();
        if let Some((id, _)) = state.settings.get(name) {
            return Some(*id);
        }
        if !state.open_settings {
            return None;
        }
        let id = SettingId(state.next_id());
        state
            .settings
            .insert(name.to_string(), (id, String::new()));
        Some(id)
    }

    fn set_value(&self, id: SettingId, value: &str) -> Result<(), HostError> {
        let mut state = self.state();
        let Some(name) = state
            .settings
            .iter()
            .find(|(_, (sid, _))| *sid == id)
            .map(|(name, _)| name.clone())
        else {
            return Err(HostError::NotFound(format!("setting {}", id.0)));
        };
        if state.read_only.contains(&name) {
            return Err(HostError::Rejected(format!("{name} is read-only")));
        }
        if let Some(entry) = state.settings.get_mut(&name) {
            entry.1 = value.to_string();
        }
        Ok(())
    }
}

impl CommandSink for MemoryHost {
    fn submit(&self, command: &str) {
        self.state().submitted.push(command.to_string());
    }
}
