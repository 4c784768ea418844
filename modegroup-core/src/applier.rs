//! SettingsApplier - pushes a mode's settings and commands to the host

use std::collections::BTreeMap;
use std::sync::Arc;

use modegroup_host_api::{CommandSink, SettingsRegistry};

use crate::config::{Mode, SettingRoute};
use crate::report::{ApplyReport, SettingApplication, SettingOutcome};

/// Applies settings and commands. Stateless; every entry is independent.
#[derive(Clone)]
pub struct SettingsApplier {
    settings: Arc<dyn SettingsRegistry>,
    commands: Arc<dyn CommandSink>,
}

impl SettingsApplier {
    pub fn new(settings: Arc<dyn SettingsRegistry>, commands: Arc<dyn CommandSink>) -> Self {
        Self { settings, commands }
    }

    /// Settings first, then commands in declaration order
    pub fn apply(&self, mode: &Mode) -> ApplyReport {
        ApplyReport {
            settings: self.apply_settings(&mode.settings, &mode.setting_route),
            commands: self.run_commands(&mode.commands),
        }
    }

    pub fn apply_settings(
        &self,
        settings: &BTreeMap<String, String>,
        route: &SettingRoute,
    ) -> Vec<SettingApplication> {
        settings
            .iter()
            .map(|(name, value)| SettingApplication {
                name: name.clone(),
                value: value.clone(),
                outcome: self.apply_one(name, value, route),
            })
            .collect()
    }

    fn apply_one(&self, name: &str, value: &str, route: &SettingRoute) -> SettingOutcome {
        if let Some(command) = route.render(name, value) {
            self.commands.submit(&command);
            tracing::info!(setting = %name, value = %value, "Set cvar via command");
            return SettingOutcome::Submitted { command };
        }

        let Some(id) = self.settings.find(name) else {
            tracing::warn!(setting = %name, "Cvar not found");
            return SettingOutcome::NotFound;
        };

        match self.settings.set_value(id, value) {
            Ok(()) => {
                tracing::info!(setting = %name, value = %value, "Set cvar");
                SettingOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(setting = %name, error = %e, "Failed to set cvar");
                SettingOutcome::Rejected {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Submit each command; returns what was submitted
    pub fn run_commands(&self, commands: &[String]) -> Vec<String> {
        for command in commands {
            self.commands.submit(command);
            tracing::info!(command = %command, "Executed command");
        }
        commands.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn mode() -> Mode {
        let mut mode = Mode::new("combat");
        mode.settings.insert("friendlyfire".into(), "0".into());
        mode.settings.insert("missing_cvar".into(), "1".into());
        mode.settings.insert("sv_cheats".into(), "1".into());
        mode.commands = vec!["mp_restartgame 1".into(), "say go".into()];
        mode
    }

    fn host() -> Arc<MemoryHost> {
        Arc::new(
            MemoryHost::new()
                .with_setting("friendlyfire", "1")
                .with_setting("sv_cheats", "0")
                .with_read_only_setting("sv_cheats"),
        )
    }

    #[test]
    fn test_apply_continues_past_missing_and_rejected_settings() {
        let host = host();
        let applier = SettingsApplier::new(host.clone(), host.clone());

        let report = applier.apply(&mode());

        let outcomes: Vec<_> = report
            .settings
            .iter()
            .map(|s| (s.name.as_str(), &s.outcome))
            .collect();
        assert_eq!(outcomes[0], ("friendlyfire", &SettingOutcome::Applied));
        assert_eq!(outcomes[1], ("missing_cvar", &SettingOutcome::NotFound));
        assert!(matches!(outcomes[2].1, SettingOutcome::Rejected { .. }));

        assert_eq!(host.setting("friendlyfire").as_deref(), Some("0"));
        assert_eq!(host.setting("sv_cheats").as_deref(), Some("0"));
        assert_eq!(host.submitted(), vec!["mp_restartgame 1", "say go"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_command_route_bypasses_registry() {
        let host = host();
        let applier = SettingsApplier::new(host.clone(), host.clone());
        let mut mode = mode();
        mode.setting_route = SettingRoute::from_flag("1");
        mode.commands.clear();

        let report = applier.apply(&mode);

        assert!(report.is_clean());
        assert_eq!(
            host.submitted(),
            vec![
                "sm_cvar friendlyfire 0",
                "sm_cvar missing_cvar 1",
                "sm_cvar sv_cheats 1",
            ]
        );
        // Registry untouched
        assert_eq!(host.setting("friendlyfire").as_deref(), Some("1"));
    }

    #[test]
    fn test_commands_keep_declaration_order() {
        let host = host();
        let applier = SettingsApplier::new(host.clone(), host.clone());
        let commands = vec!["b".to_string(), "a".to_string(), "c".to_string()];

        assert_eq!(applier.run_commands(&commands), commands);
        assert_eq!(host.submitted(), vec!["b", "a", "c"]);
    }
}
