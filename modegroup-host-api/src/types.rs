//! Handles and status values exchanged with the host

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier the module loader hands out for a loaded module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleHandle(pub u64);

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state the host reports for a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    /// Loaded and executing
    Running,
    /// Loaded but paused by someone
    Paused,
    /// Stopped, pending removal
    Stopped,
    /// Loaded but in an error state
    Error,
    /// Failed to start
    Failed,
}

impl ModuleStatus {
    /// Only running modules are candidates for unloading
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Result of a successful load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedModule {
    pub handle: ModuleHandle,
    /// The file was already loaded before this request
    pub already_loaded: bool,
}

/// One row of the host's module listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub handle: ModuleHandle,
    /// Path as the loader knows it (relative to its plugins root)
    pub path: String,
    pub status: ModuleStatus,
}

/// Identifier of a setting resolved through the settings registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettingId(pub u64);

/// Registration token returned by [`crate::ModuleRegistry::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);
