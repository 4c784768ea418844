//! Mode definitions and the mode table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the root section that holds every mode
pub const DEFAULT_ROOT_SECTION: &str = "ModeGroups";

/// Prefix used when a mode routes its settings through `sm_cvar`
pub const SM_CVAR_PREFIX: &str = "sm_cvar";

/// How a mode's settings reach the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingRoute {
    /// Resolve each setting through the settings registry
    #[default]
    Registry,
    /// Render each setting as a console command, `"<prefix> <name> <value>"`
    Command { prefix: String },
}

impl SettingRoute {
    /// Interpret the value of a mode's `use_sm_cvar` key
    pub fn from_flag(value: &str) -> Self {
        let prefix = if matches!(value.trim(), "1" | "true") {
            SM_CVAR_PREFIX
        } else {
            ""
        };
        Self::Command {
            prefix: prefix.to_string(),
        }
    }

    /// Console command for a setting, or `None` for registry routing
    pub fn render(&self, name: &str, value: &str) -> Option<String> {
        match self {
            Self::Registry => None,
            Self::Command { prefix } if prefix.is_empty() => Some(format!("{name} {value}")),
            Self::Command { prefix } => Some(format!("{prefix} {name} {value}")),
        }
    }
}

/// A named bundle of modules, settings and commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// Section name; unique and case-sensitive
    pub name: String,
    /// Directory under the plugins root scanned recursively for modules
    pub scan_directory: Option<String>,
    /// Modules to load, in declaration order
    pub load: Vec<String>,
    /// Modules to force-unload regardless of who loaded them
    pub unload: Vec<String>,
    /// Setting name to value
    pub settings: BTreeMap<String, String>,
    /// Raw console commands, in declaration order
    pub commands: Vec<String>,
    pub setting_route: SettingRoute,
}

impl Mode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scan_directory: None,
            load: Vec::new(),
            unload: Vec::new(),
            settings: BTreeMap::new(),
            commands: Vec::new(),
            setting_route: SettingRoute::default(),
        }
    }
}

/// Every mode from one config file, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeTable {
    modes: BTreeMap<String, Mode>,
}

impl ModeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mode, replacing any earlier mode with the same name
    pub fn insert(&mut self, mode: Mode) -> Option<Mode> {
        self.modes.insert(mode.name.clone(), mode)
    }

    pub fn get(&self, name: &str) -> Option<&Mode> {
        self.modes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modes.contains_key(name)
    }

    /// Mode names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mode> {
        self.modes.values()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl FromIterator<Mode> for ModeTable {
    fn from_iter<I: IntoIterator<Item = Mode>>(iter: I) -> Self {
        let mut table = Self::new();
        for mode in iter {
            table.insert(mode);
        }
        table
    }
}
