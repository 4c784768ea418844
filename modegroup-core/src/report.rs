//! Per-entry outcomes of a mode switch

use modegroup_host_api::{ModuleHandle, ModuleStatus};
use serde::Serialize;
use std::fmt;

/// What happened to one module in the load phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Loaded by this switch and tracked
    Loaded { handle: ModuleHandle },
    /// Was already running; not tracked, never unloaded by us
    AlreadyLoaded { handle: ModuleHandle },
    Failed { error: String },
    /// Not attempted
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleLoad {
    pub path: String,
    #[serde(flatten)]
    pub outcome: LoadOutcome,
}

/// What happened to one module in an unload pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UnloadOutcome {
    Unloaded,
    /// Paused, stopped or already gone; left alone
    NotRunning { status: Option<ModuleStatus> },
    /// No module with this path is loaded
    NotFound,
    /// The host refused; the module keeps running untracked
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleUnload {
    /// Module path, or the handle display (`#3`) if the host lost track of it
    pub target: String,
    pub handle: Option<ModuleHandle>,
    #[serde(flatten)]
    pub outcome: UnloadOutcome,
}

/// What happened to one setting in the apply phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SettingOutcome {
    Applied,
    NotFound,
    Rejected { error: String },
    /// Routed through the command sink instead of the registry
    Submitted { command: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingApplication {
    pub name: String,
    pub value: String,
    #[serde(flatten)]
    pub outcome: SettingOutcome,
}

/// Result of applying a mode's settings and commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub settings: Vec<SettingApplication>,
    /// Commands submitted, in order
    pub commands: Vec<String>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.settings.iter().all(|s| {
            matches!(
                s.outcome,
                SettingOutcome::Applied | SettingOutcome::Submitted { .. }
            )
        })
    }
}

/// Everything a completed switch did
///
/// A switch always runs to completion once the mode is found; this report is
/// how callers see which individual entries did not go as planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchReport {
    pub mode: String,
    pub previous: Option<String>,
    /// Modules owned by the previous mode
    pub unloaded: Vec<ModuleUnload>,
    pub loaded: Vec<ModuleLoad>,
    /// The mode's explicit unload list
    pub force_unloaded: Vec<ModuleUnload>,
    pub applied: ApplyReport,
}

impl SwitchReport {
    pub(crate) fn new(mode: &str, previous: Option<String>) -> Self {
        Self {
            mode: mode.to_string(),
            previous,
            unloaded: Vec::new(),
            loaded: Vec::new(),
            force_unloaded: Vec::new(),
            applied: ApplyReport::default(),
        }
    }

    /// Every entry succeeded (or was deliberately left alone)
    pub fn is_clean(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
            .iter()
            .filter(|m| matches!(m.outcome, LoadOutcome::Loaded { .. }))
            .count()
    }

    /// One line per failed entry
    pub fn failures(&self) -> Vec<String> {
        let mut out = Vec::new();
        for m in self.unloaded.iter().chain(&self.force_unloaded) {
            if let UnloadOutcome::Failed { error } = &m.outcome {
                out.push(format!("unload {}: {}", m.target, error));
            }
        }
        for m in &self.loaded {
            if let LoadOutcome::Failed { error } = &m.outcome {
                out.push(format!("load {}: {}", m.path, error));
            }
        }
        for s in &self.applied.settings {
            match &s.outcome {
                SettingOutcome::NotFound => out.push(format!("setting {}: not found", s.name)),
                SettingOutcome::Rejected { error } => {
                    out.push(format!("setting {}: {}", s.name, error))
                }
                SettingOutcome::Applied | SettingOutcome::Submitted { .. } => {}
            }
        }
        out
    }
}

impl fmt::Display for SwitchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Switched to mode group: {} (from {})",
            self.mode,
            self.previous.as_deref().unwrap_or("none")
        )?;
        writeln!(
            f,
            "  unloaded {}, loaded {}/{}, settings {}, commands {}",
            self.unloaded
                .iter()
                .filter(|m| m.outcome == UnloadOutcome::Unloaded)
                .count(),
            self.loaded_count(),
            self.loaded.len(),
            self.applied.settings.len(),
            self.applied.commands.len()
        )?;
        for failure in self.failures() {
            writeln!(f, "  ! {}", failure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SwitchReport {
        let mut report = SwitchReport::new("combat", Some("casual".into()));
        report.loaded.push(ModuleLoad {
            path: "combat/a.smx".into(),
            outcome: LoadOutcome::Loaded {
                handle: ModuleHandle(1),
            },
        });
        report
    }

    #[test]
    fn test_clean_report() {
        let report = report();
        assert!(report.is_clean());
        assert_eq!(report.loaded_count(), 1);
    }

    #[test]
    fn test_failures_are_listed() {
        let mut report = report();
        report.loaded.push(ModuleLoad {
            path: "combat/b.smx".into(),
            outcome: LoadOutcome::Failed {
                error: "bad header".into(),
            },
        });
        report.applied.settings.push(SettingApplication {
            name: "friendlyfire".into(),
            value: "0".into(),
            outcome: SettingOutcome::NotFound,
        });

        assert!(!report.is_clean());
        assert_eq!(
            report.failures(),
            vec![
                "load combat/b.smx: bad header".to_string(),
                "setting friendlyfire: not found".to_string(),
            ]
        );
        let text = report.to_string();
        assert!(text.contains("Switched to mode group: combat (from casual)"));
        assert!(text.contains("loaded 1/2"));
    }

    #[test]
    fn test_not_running_is_not_a_failure() {
        let mut report = report();
        report.unloaded.push(ModuleUnload {
            target: "#4".into(),
            handle: Some(ModuleHandle(4)),
            outcome: UnloadOutcome::NotRunning {
                status: Some(ModuleStatus::Paused),
            },
        });
        assert!(report.is_clean());
    }

    #[test]
    fn test_report_serializes_flat_outcomes() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["loaded"][0]["outcome"], "loaded");
        assert_eq!(json["loaded"][0]["path"], "combat/a.smx");
    }
}
