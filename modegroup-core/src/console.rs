//! Console command surface for the `modegroup` root command
//!
//! ```text
//! sm modegroup switch <name>
//! sm modegroup reload
//! sm modegroup list
//! sm modegroup current
//! ```

use crate::engine::ModeSwitchEngine;

/// Name of the root console command
pub const ROOT_COMMAND: &str = "modegroup";

/// A parsed `modegroup` subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// No subcommand: print the menu
    Menu,
    Switch { name: String },
    Reload,
    List,
    Current,
    /// Malformed input; the message is printed before the menu
    Invalid { message: String },
}

impl ConsoleCommand {
    /// Parse the arguments following the root command
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let Some(sub) = args.first() else {
            return Self::Menu;
        };

        match sub.as_ref() {
            "switch" => match args.get(1) {
                Some(name) => Self::Switch {
                    name: name.as_ref().to_string(),
                },
                None => Self::Invalid {
                    message: "Usage: sm modegroup switch <groupname>".to_string(),
                },
            },
            "reload" => Self::Reload,
            "list" => Self::List,
            "current" => Self::Current,
            other => Self::Invalid {
                message: format!("Unknown command '{other}'"),
            },
        }
    }

    /// Parse a full console line such as `sm modegroup switch combat`.
    ///
    /// Returns `None` if the line is not addressed to the root command.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.first() == Some(&"sm") {
            tokens.remove(0);
        }
        match tokens.split_first() {
            Some((root, rest)) if *root == ROOT_COMMAND => Some(Self::parse(rest)),
            _ => None,
        }
    }
}

/// Text printed back to the console
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleOutput {
    pub lines: Vec<String>,
    /// The command did what was asked
    pub ok: bool,
}

impl ConsoleOutput {
    fn ok(lines: Vec<String>) -> Self {
        Self { lines, ok: true }
    }

    fn failed(lines: Vec<String>) -> Self {
        Self { lines, ok: false }
    }
}

fn menu() -> Vec<String> {
    [
        "Mode Group Manager Menu:",
        "Usage: sm modegroup [arguments]",
        "    switch              - Switch to a mode group",
        "    reload              - Reload mode group configuration",
        "    list                - List available mode groups",
        "    current             - Show current mode group",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Run a console command against the engine
pub fn dispatch(engine: &mut ModeSwitchEngine, command: ConsoleCommand) -> ConsoleOutput {
    match command {
        ConsoleCommand::Menu => ConsoleOutput::ok(menu()),
        ConsoleCommand::Invalid { message } => {
            let mut lines = vec![message];
            lines.extend(menu());
            ConsoleOutput::failed(lines)
        }
        ConsoleCommand::Switch { name } => match engine.switch_to(&name) {
            Ok(report) => {
                let mut lines = vec![format!("Switched to mode group: {name}")];
                lines.extend(report.failures().into_iter().map(|f| format!("  ! {f}")));
                ConsoleOutput::ok(lines)
            }
            Err(e) => ConsoleOutput::failed(vec![e.to_string()]),
        },
        ConsoleCommand::Reload => match engine.reload_config() {
            Ok(count) => ConsoleOutput::ok(vec![format!(
                "Configuration reloaded successfully ({count} mode groups)"
            )]),
            Err(e) => ConsoleOutput::failed(vec![format!("Failed to reload configuration: {e}")]),
        },
        ConsoleCommand::List => {
            let modes = engine.list_modes();
            if modes.is_empty() {
                return ConsoleOutput::ok(vec!["No mode groups configured".to_string()]);
            }
            let mut lines = vec!["Available mode groups:".to_string()];
            lines.extend(modes.into_iter().map(|name| format!("  - {name}")));
            ConsoleOutput::ok(lines)
        }
        ConsoleCommand::Current => ConsoleOutput::ok(vec![match engine.current_mode() {
            Some(name) => format!("Current mode group: {name}"),
            None => "No mode group currently active".to_string(),
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigStore, Mode, ModeTable};
    use crate::engine::{EngineConfig, HostServices};
    use crate::host::MemoryHost;
    use std::sync::Arc;

    fn engine() -> ModeSwitchEngine {
        let mut combat = Mode::new("combat");
        combat.load = vec!["combat/a.smx".into(), "combat/broken.smx".into()];
        let table: ModeTable = [combat, Mode::new("casual")].into_iter().collect();
        let host = Arc::new(MemoryHost::new());
        host.fail_load("combat/broken.smx", "bad magic");
        let store = ConfigStore::from_table("/nonexistent/modegroup.cfg", "ModeGroups", table);
        ModeSwitchEngine::new(store, HostServices::from_host(host), &EngineConfig::default())
    }

    #[test]
    fn test_parse_subcommands() {
        assert_eq!(ConsoleCommand::parse::<&str>(&[]), ConsoleCommand::Menu);
        assert_eq!(
            ConsoleCommand::parse(&["switch", "combat"]),
            ConsoleCommand::Switch {
                name: "combat".into()
            }
        );
        assert_eq!(ConsoleCommand::parse(&["reload"]), ConsoleCommand::Reload);
        assert_eq!(ConsoleCommand::parse(&["list"]), ConsoleCommand::List);
        assert_eq!(ConsoleCommand::parse(&["current"]), ConsoleCommand::Current);
        assert!(matches!(
            ConsoleCommand::parse(&["switch"]),
            ConsoleCommand::Invalid { .. }
        ));
        assert!(matches!(
            ConsoleCommand::parse(&["dance"]),
            ConsoleCommand::Invalid { .. }
        ));
    }

    #[test]
    fn test_parse_line_strips_sm_prefix() {
        assert_eq!(
            ConsoleCommand::parse_line("sm modegroup switch ctf"),
            Some(ConsoleCommand::Switch { name: "ctf".into() })
        );
        assert_eq!(
            ConsoleCommand::parse_line("  modegroup   list "),
            Some(ConsoleCommand::List)
        );
        assert_eq!(ConsoleCommand::parse_line("sm plugins list"), None);
        assert_eq!(ConsoleCommand::parse_line(""), None);
    }

    #[test]
    fn test_dispatch_list_and_current() {
        let mut engine = engine();
        let out = dispatch(&mut engine, ConsoleCommand::List);
        assert_eq!(
            out.lines,
            vec!["Available mode groups:", "  - casual", "  - combat"]
        );

        let out = dispatch(&mut engine, ConsoleCommand::Current);
        assert_eq!(out.lines, vec!["No mode group currently active"]);
    }

    #[test]
    fn test_dispatch_switch_reports_failures() {
        let mut engine = engine();
        let out = dispatch(
            &mut engine,
            ConsoleCommand::Switch {
                name: "combat".into(),
            },
        );

        assert!(out.ok);
        assert_eq!(out.lines[0], "Switched to mode group: combat");
        assert!(out.lines[1].contains("combat/broken.smx"));
        assert_eq!(
            dispatch(&mut engine, ConsoleCommand::Current).lines,
            vec!["Current mode group: combat"]
        );
    }

    #[test]
    fn test_dispatch_switch_unknown_mode() {
        let mut engine = engine();
        let out = dispatch(&mut engine, ConsoleCommand::Switch { name: "ctf".into() });
        assert!(!out.ok);
        assert_eq!(out.lines, vec!["Mode group 'ctf' not found"]);
    }

    #[test]
    fn test_dispatch_reload_failure_keeps_modes() {
        let mut engine = engine();
        let out = dispatch(&mut engine, ConsoleCommand::Reload);
        assert!(!out.ok);
        assert!(out.lines[0].starts_with("Failed to reload configuration"));
        assert_eq!(engine.list_modes().len(), 2);
    }

    #[test]
    fn test_dispatch_invalid_prints_menu() {
        let mut engine = engine();
        let out = dispatch(
            &mut engine,
            ConsoleCommand::Invalid {
                message: "Unknown command 'x'".into(),
            },
        );
        assert!(!out.ok);
        assert_eq!(out.lines[0], "Unknown command 'x'");
        assert_eq!(out.lines[1], "Mode Group Manager Menu:");
    }
}
