//! modegroup-host-api - the host services modegroup drives
//!
//! The mode switch engine never talks to a game server directly. Everything it
//! needs from the host goes through the traits in this crate:
//!
//! - [`ModuleRegistry`]: load, unload, query and enumerate plugin modules
//! - [`SettingsRegistry`]: find a setting by name and set its value
//! - [`CommandSink`]: queue a raw console command for execution
//! - [`ModuleListener`]: callbacks the host fires when modules start or stop
//!
//! # Example
//!
//! ```ignore
//! use modegroup_host_api::CommandSink;
//!
//! struct ServerConsole;
//!
//! impl CommandSink for ServerConsole {
//!     fn submit(&self, command: &str) {
//!         engine_server_command(command);
//!     }
//! }
//! ```

pub mod error;
pub mod types;

use std::sync::Arc;

pub use error::HostError;
pub use types::*;

/// The host's module loader
///
/// Implementations must not hold internal locks while invoking listeners,
/// since a listener may be called synchronously from within [`Self::load`]
/// or [`Self::unload`].
pub trait ModuleRegistry: Send + Sync {
    /// Load a module by path. `persistent` asks the host to keep it across
    /// map changes; modegroup always passes `false`.
    fn load(&self, path: &str, persistent: bool) -> Result<LoadedModule, HostError>;

    /// Request an unload
    fn unload(&self, handle: ModuleHandle) -> Result<(), HostError>;

    /// Current status, or `None` if the handle is no longer known
    fn status(&self, handle: ModuleHandle) -> Option<ModuleStatus>;

    /// Every module the host knows about
    fn list_all(&self) -> Vec<ModuleEntry>;

    /// Register a listener for start/stop notifications
    fn add_listener(&self, listener: Arc<dyn ModuleListener>) -> ListenerId;

    /// Remove a previously registered listener
    fn remove_listener(&self, id: ListenerId);

    /// Find a module by the path it was loaded from
    fn find_by_path(&self, path: &str) -> Option<ModuleEntry> {
        self.list_all().into_iter().find(|entry| entry.path == path)
    }
}

/// The host's settings (console variable) registry
pub trait SettingsRegistry: Send + Sync {
    /// Resolve a setting by name
    fn find(&self, name: &str) -> Option<SettingId>;

    /// Set the value of a resolved setting
    fn set_value(&self, id: SettingId, value: &str) -> Result<(), HostError>;
}

/// The host's "run this console command" entry point. Fire-and-forget.
pub trait CommandSink: Send + Sync {
    fn submit(&self, command: &str);
}

/// Notifications the host sends about module lifecycle
pub trait ModuleListener: Send + Sync {
    /// A module finished loading and is running
    fn on_module_started(&self, handle: ModuleHandle);

    /// A module was unloaded
    fn on_module_stopped(&self, handle: ModuleHandle);
}
