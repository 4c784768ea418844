//! Ownership bookkeeping shared between the engine and the host's callbacks

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use modegroup_host_api::{ModuleHandle, ModuleListener};

/// Whether load notifications are currently attributed to a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPhase {
    Idle,
    Switching,
}

/// Modules the current mode caused to load
#[derive(Debug)]
pub(crate) struct Ownership {
    pub(crate) phase: SwitchPhase,
    pub(crate) active: Vec<ModuleHandle>,
}

impl Ownership {
    pub(crate) fn track(&mut self, handle: ModuleHandle) {
        if !self.active.contains(&handle) {
            self.active.push(handle);
        }
    }

    pub(crate) fn untrack(&mut self, handle: ModuleHandle) -> bool {
        let before = self.active.len();
        self.active.retain(|h| *h != handle);
        self.active.len() != before
    }
}

/// Cloneable handle to the shared ownership state
#[derive(Debug, Clone)]
pub(crate) struct SharedOwnership(Arc<Mutex<Ownership>>);

impl SharedOwnership {
    pub(crate) fn new() -> Self {
        Self(Arc::new(Mutex::new(Ownership {
            phase: SwitchPhase::Idle,
            active: Vec::new(),
        })))
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Ownership> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Turn attribution on until the returned guard drops
    pub(crate) fn begin_switch(&self) -> SwitchWindow {
        self.lock().phase = SwitchPhase::Switching;
        SwitchWindow {
            ownership: self.clone(),
        }
    }
}

/// Attribution window; closes on drop, including on unwind
pub(crate) struct SwitchWindow {
    ownership: SharedOwnership,
}

impl Drop for SwitchWindow {
    fn drop(&mut self) {
        self.ownership.lock().phase = SwitchPhase::Idle;
    }
}

/// Listener registered with the module registry on the engine's behalf
///
/// Modules that start while a switch is in progress belong to that switch.
/// Modules that start at any other time belong to someone else and are never
/// tracked. A module that stops is forgotten whoever stopped it.
pub struct ListenerBridge {
    ownership: SharedOwnership,
}

impl ListenerBridge {
    pub(crate) fn new(ownership: SharedOwnership) -> Self {
        Self { ownership }
    }
}

impl ModuleListener for ListenerBridge {
    fn on_module_started(&self, handle: ModuleHandle) {
        let mut ownership = self.ownership.lock();
        if ownership.phase == SwitchPhase::Switching {
            ownership.track(handle);
            tracing::debug!(handle = %handle, "Module started during switch, tracking");
        }
    }

    fn on_module_stopped(&self, handle: ModuleHandle) {
        if self.ownership.lock().untrack(handle) {
            tracing::debug!(handle = %handle, "Tracked module stopped");
        }
    }
}
