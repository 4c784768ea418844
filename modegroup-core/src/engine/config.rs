//! Engine settings - where the host lives and how switches behave
//!
//! Stored as TOML in `~/.config/modegroup/settings.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use modegroup_paths::HostLayout;

use crate::config::DEFAULT_ROOT_SECTION;
use crate::error::EngineConfigError;
use crate::scanner::DEFAULT_MODULE_EXTENSION;

/// How module paths are handed to the module loader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    /// Relative to the plugins directory, as written in the config
    #[default]
    Relative,
    /// Joined onto the plugins directory; absolute entries pass through
    Absolute,
}

/// What the load phase does about modules that refused to unload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnloadFailurePolicy {
    /// Load everything anyway; the stuck module coexists with the new mode
    #[default]
    Coexist,
    /// Skip load entries whose path is still running from the previous mode
    SkipStillRunning,
}

/// What happens to the active mode when the mode file is reloaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Keep the current mode and the modules it loaded
    #[default]
    KeepCurrent,
    /// Unload the current mode's modules and clear it before re-reading
    UnloadCurrent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Host installation root; see [`modegroup_paths::default_host_root`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_root: Option<PathBuf>,
    /// Mode file, relative to the host root
    pub mode_config: PathBuf,
    /// Plugins directory, relative to the host root
    pub plugins_dir: PathBuf,
    pub module_extension: String,
    /// Name of the section wrapping all modes
    pub root_section: String,
    pub path_style: PathStyle,
    pub unload_failure: UnloadFailurePolicy,
    pub on_reload: ReloadPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host_root: None,
            mode_config: PathBuf::from("configs/modegroup.cfg"),
            plugins_dir: PathBuf::from("plugins"),
            module_extension: DEFAULT_MODULE_EXTENSION.to_string(),
            root_section: DEFAULT_ROOT_SECTION.to_string(),
            path_style: PathStyle::default(),
            unload_failure: UnloadFailurePolicy::default(),
            on_reload: ReloadPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        modegroup_paths::config_dir().join("settings.toml")
    }

    /// Load settings from a TOML file
    ///
    /// Returns defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, EngineConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save settings to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), EngineConfigError> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolved host layout
    pub fn layout(&self) -> HostLayout {
        let root = self
            .host_root
            .clone()
            .unwrap_or_else(modegroup_paths::default_host_root);
        HostLayout::with_parts(root, &self.plugins_dir, &self.mode_config)
    }
}
