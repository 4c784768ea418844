//! Streaming state machine that turns section events into a [`ModeTable`]
//!
//! ```text
//! Root ──enter(root)──▶ InGroups ──enter(name)──▶ InMode ──enter(block)──▶ InBlock
//!  ▲                       │  ▲                      │  ▲                      │
//!  └────────leave──────────┘  └──leave (commit)──────┘  └────────leave─────────┘
//! ```
//!
//! A mode is only stored on a clean leave from `InMode`, so a section cut off
//! by malformed input never reaches the table. Unknown sections at any level
//! are skipped together with everything inside them.

use super::smc::SectionListener;
use super::types::{Mode, ModeTable, SettingRoute};
use crate::error::ConfigError;

/// Typed collections that can appear inside a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Cvars,
    Commands,
    Load,
    Unload,
}

impl Block {
    fn from_section(name: &str) -> Option<Self> {
        match name {
            "cvars" => Some(Self::Cvars),
            "commands" => Some(Self::Commands),
            "load" | "load_plugins" | "plugins" => Some(Self::Load),
            "unload" | "unload_plugins" => Some(Self::Unload),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum State {
    Root,
    InGroups,
    InMode(Mode),
    InBlock(Block, Mode),
}

/// Builds a mode table from [`SectionListener`] events
#[derive(Debug)]
pub struct ModeTableBuilder {
    root_section: String,
    state: State,
    /// Depth inside a section being ignored; 0 when not skipping
    skip_depth: usize,
    saw_root: bool,
    table: ModeTable,
}

impl ModeTableBuilder {
    pub fn new(root_section: impl Into<String>) -> Self {
        Self {
            root_section: root_section.into(),
            state: State::Root,
            skip_depth: 0,
            saw_root: false,
            table: ModeTable::new(),
        }
    }

    /// Finish parsing. Fails if the root section never appeared.
    pub fn finish(self) -> Result<ModeTable, ConfigError> {
        if !self.saw_root {
            return Err(ConfigError::MissingRoot(self.root_section));
        }
        Ok(self.table)
    }

    fn block_entry(block: Block, mode: &mut Mode, key: &str, value: &str) {
        match block {
            Block::Cvars => {
                mode.settings.insert(key.to_string(), value.to_string());
            }
            Block::Commands => {
                let command = match (key, value.trim()) {
                    // `command` is only a label; its value is the command text
                    ("command", text) => text.to_string(),
                    (bare, "") => bare.trim().to_string(),
                    (name, args) if name.trim().is_empty() => args.to_string(),
                    (name, args) => format!("{} {args}", name.trim()),
                };
                if !command.is_empty() {
                    mode.commands.push(command);
                }
            }
            Block::Load | Block::Unload => {
                // Keys are free labels; an entry without a path is dropped
                let path = value.trim();
                if path.is_empty() {
                    tracing::debug!(mode = %mode.name, label = %key, "Skipping plugin entry without a path");
                    return;
                }
                let list = if block == Block::Load {
                    &mut mode.load
                } else {
                    &mut mode.unload
                };
                list.push(path.to_string());
            }
        }
    }
}

impl SectionListener for ModeTableBuilder {
    fn enter_section(&mut self, name: &str) {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return;
        }

        self.state = match std::mem::replace(&mut self.state, State::Root) {
            State::Root if name == self.root_section => {
                self.saw_root = true;
                State::InGroups
            }
            State::InGroups => State::InMode(Mode::new(name)),
            State::InMode(mode) => match Block::from_section(name) {
                Some(block) => State::InBlock(block, mode),
                None => {
                    tracing::debug!(mode = %mode.name, section = %name, "Ignoring unknown section");
                    self.skip_depth = 1;
                    State::InMode(mode)
                }
            },
            other => {
                self.skip_depth = 1;
                other
            }
        };
    }

    fn key_value(&mut self, key: &str, value: &str) {
        if self.skip_depth > 0 {
            return;
        }

        match &mut self.state {
            State::InMode(mode) => match key {
                "plugin_directory" => {
                    let dir = value.trim();
                    mode.scan_directory = (!dir.is_empty()).then(|| dir.to_string());
                }
                "use_sm_cvar" => mode.setting_route = SettingRoute::from_flag(value),
                _ => {}
            },
            State::InBlock(block, mode) => Self::block_entry(*block, mode, key, value),
            State::Root | State::InGroups => {}
        }
    }

    fn leave_section(&mut self) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }

        self.state = match std::mem::replace(&mut self.state, State::Root) {
            State::InBlock(_, mode) => State::InMode(mode),
            State::InMode(mode) => {
                if self.table.insert(mode).is_some() {
                    tracing::warn!("Duplicate mode definition replaced an earlier one");
                }
                State::InGroups
            }
            State::InGroups | State::Root => State::Root,
        };
    }
}
