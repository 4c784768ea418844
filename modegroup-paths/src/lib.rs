//! Directory layout for modegroup.
//!
//! Two kinds of paths live here:
//!
//! - XDG paths for modegroup's own files (engine settings), matching what
//!   other CLI tools do rather than platform-native locations.
//! - The host layout: a root directory containing `configs/` (where the mode
//!   file lives) and `plugins/` (the tree module paths are relative to).

use std::path::{Path, PathBuf};

/// Environment variable that overrides the host root directory.
pub const HOST_ROOT_ENV: &str = "MODEGROUP_HOST_ROOT";

/// Directory holding `settings.toml`, the engine settings file.
///
/// `$XDG_CONFIG_HOME/modegroup` when set, else `~/.config/modegroup`. The
/// mode definition file is not stored here; it belongs to the host layout.
///
/// # Examples
///
/// ```
/// use modegroup_paths::config_dir;
///
/// let settings = config_dir().join("settings.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("modegroup")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/modegroup")
    } else {
        PathBuf::from(".config/modegroup")
    }
}

/// Parent of the fallback host installation.
///
/// `$XDG_DATA_HOME/modegroup` when set, else `~/.local/share/modegroup`.
/// Only [`default_host_root`] reads it, when no host root is configured.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("modegroup")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share/modegroup")
    } else {
        PathBuf::from(".local/share/modegroup")
    }
}

/// Default host root when nothing is configured.
///
/// `$MODEGROUP_HOST_ROOT` wins, otherwise `<data dir>/host`.
pub fn default_host_root() -> PathBuf {
    match std::env::var(HOST_ROOT_ENV) {
        Ok(root) if !root.is_empty() => PathBuf::from(root),
        _ => data_dir().join("host"),
    }
}

/// Paths inside a host installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    root: PathBuf,
    plugins_dir: PathBuf,
    mode_config: PathBuf,
}

impl HostLayout {
    /// Conventional layout: `<root>/plugins` and `<root>/configs/modegroup.cfg`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_parts(root, "plugins", "configs/modegroup.cfg")
    }

    /// Layout with custom locations. Relative parts are resolved against `root`,
    /// absolute parts are used as-is.
    pub fn with_parts(
        root: impl Into<PathBuf>,
        plugins_dir: impl AsRef<Path>,
        mode_config: impl AsRef<Path>,
    ) -> Self {
        let root = root.into();
        let plugins_dir = root.join(plugins_dir);
        let mode_config = root.join(mode_config);
        Self {
            root,
            plugins_dir,
            mode_config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory module paths are relative to.
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// The mode definition file.
    pub fn mode_config(&self) -> &Path {
        &self.mode_config
    }
}
