//! modegroup-core: named mode switching for game server plugins
//!
//! A *mode* bundles plugin modules, settings and commands. Switching modes
//! unloads the modules the previous mode brought up, loads the new mode's
//! modules, applies its settings and runs its commands.
//!
//! - **Configuration** - [`ConfigStore`] parses the mode file into a [`ModeTable`]
//! - **Scanning** - [`DirectoryScanner`] finds module files below the plugins directory
//! - **Switching** - [`ModeSwitchEngine`] drives the unload/load/apply sequence
//! - **Settings** - [`SettingsApplier`] pushes settings and commands to the host
//! - **Console** - [`console`] maps `modegroup ...` console commands to engine calls
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use modegroup_core::{ConfigStore, EngineConfig, HostServices, MemoryHost, ModeSwitchEngine};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let layout = config.layout();
//!     let store = ConfigStore::load(layout.mode_config(), &config.root_section)?;
//!
//!     let host = Arc::new(MemoryHost::new().with_open_settings());
//!     let mut engine = ModeSwitchEngine::new(store, HostServices::from_host(host), &config);
//!     engine.start();
//!
//!     let report = engine.switch_to("combat")?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod applier;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod report;
pub mod scanner;

// Re-export key types for convenience
pub use applier::SettingsApplier;
pub use config::{ConfigStore, Mode, ModeTable, SettingRoute};
pub use console::{ConsoleCommand, ConsoleOutput};
pub use engine::{
    EngineConfig, HostServices, ListenerBridge, ModeSwitchEngine, PathStyle, ReloadPolicy,
    SwitchPhase, UnloadFailurePolicy,
};
pub use error::{ConfigError, EngineConfigError, SwitchError};
pub use events::{ModeObserver, ObserverList};
pub use host::MemoryHost;
pub use report::{
    ApplyReport, LoadOutcome, ModuleLoad, ModuleUnload, SettingApplication, SettingOutcome,
    SwitchReport, UnloadOutcome,
};
pub use scanner::DirectoryScanner;
