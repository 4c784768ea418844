//! CLI subcommands and the engine settings they share

pub mod config;
pub mod console;
pub mod modes;
pub mod switch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use modegroup_core::{ConfigStore, EngineConfig, HostServices, MemoryHost, ModeSwitchEngine};

/// Engine settings after applying the global flags
pub struct Context {
    pub settings_path: PathBuf,
    pub config: EngineConfig,
}

impl Context {
    pub fn load(
        settings: Option<PathBuf>,
        root: Option<PathBuf>,
        mode_config: Option<PathBuf>,
    ) -> Result<Self> {
        let settings_path = settings.unwrap_or_else(EngineConfig::default_path);
        let mut config = EngineConfig::load(&settings_path).with_context(|| {
            format!("Failed to read settings from {}", settings_path.display())
        })?;

        if let Some(root) = root {
            config.host_root = Some(root);
        }
        if let Some(path) = mode_config {
            config.mode_config = std::path::absolute(&path)?;
        }

        Ok(Self {
            settings_path,
            config,
        })
    }

    pub fn store(&self) -> Result<ConfigStore> {
        let path = self.config.layout().mode_config().to_path_buf();
        ConfigStore::load(&path, &self.config.root_section)
            .with_context(|| format!("Failed to load mode groups from {}", path.display()))
    }

    /// In-memory host for dry runs. Any setting name is accepted.
    pub fn dry_run_host(&self, strict_files: bool) -> Arc<MemoryHost> {
        let host = MemoryHost::new().with_open_settings();
        let host = if strict_files {
            host.with_files_root(self.config.layout().plugins_dir())
        } else {
            host
        };
        Arc::new(host)
    }

    /// Started engine over the mode file and `host`
    pub fn engine(&self, host: Arc<MemoryHost>) -> Result<ModeSwitchEngine> {
        let mut engine =
            ModeSwitchEngine::new(self.store()?, HostServices::from_host(host), &self.config);
        engine.start();
        Ok(engine)
    }
}
