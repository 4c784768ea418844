//! Read-only views of the mode group file

use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use modegroup_core::{MemoryHost, Mode, SettingRoute, SwitchError};

use super::Context;

pub fn list(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let table = store.table();

    if table.is_empty() {
        println!("No mode groups configured");
        println!();
        println!("Mode group file: {}", store.path().display());
        return Ok(());
    }

    let mut out = Table::new();
    out.load_preset(UTF8_FULL_CONDENSED);
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec![
        Cell::new("Mode").fg(Color::Cyan),
        Cell::new("Directory").fg(Color::Cyan),
        Cell::new("Load").fg(Color::Cyan),
        Cell::new("Unload").fg(Color::Cyan),
        Cell::new("Cvars").fg(Color::Cyan),
        Cell::new("Commands").fg(Color::Cyan),
    ]);

    for mode in table.iter() {
        out.add_row(vec![
            Cell::new(&mode.name),
            Cell::new(mode.scan_directory.as_deref().unwrap_or("-")),
            Cell::new(mode.load.len()),
            Cell::new(mode.unload.len()),
            Cell::new(mode.settings.len()),
            Cell::new(mode.commands.len()),
        ]);
    }

    println!("{out}");
    Ok(())
}

pub fn show(ctx: &Context, name: &str) -> Result<()> {
    let store = ctx.store()?;
    let mode = store
        .lookup(name)
        .ok_or_else(|| SwitchError::ModeNotFound(name.to_string()))?;

    print!("{}", describe(mode));
    Ok(())
}

pub fn plan(ctx: &Context, name: &str) -> Result<()> {
    let engine = ctx.engine(Arc::new(MemoryHost::new()))?;
    let paths = engine.plan(name)?;

    if paths.is_empty() {
        println!("Mode group '{name}' loads no plugins");
    }
    for path in paths {
        println!("{path}");
    }
    Ok(())
}

fn describe(mode: &Mode) -> String {
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(format!("Name:      {}", mode.name));
    line(format!(
        "Directory: {}",
        mode.scan_directory.as_deref().unwrap_or("none")
    ));
    line(format!(
        "Cvars via: {}",
        match &mode.setting_route {
            SettingRoute::Registry => "registry".to_string(),
            SettingRoute::Command { prefix } if prefix.is_empty() => "console".to_string(),
            SettingRoute::Command { prefix } => prefix.clone(),
        }
    ));

    let sections: [(&str, Vec<String>); 4] = [
        ("Load", mode.load.clone()),
        ("Unload", mode.unload.clone()),
        (
            "Cvars",
            mode.settings
                .iter()
                .map(|(name, value)| format!("{name} = {value}"))
                .collect(),
        ),
        ("Commands", mode.commands.clone()),
    ];
    for (title, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        line(String::new());
        line(format!("{title}:"));
        for entry in entries {
            line(format!("  {entry}"));
        }
    }
    out
}
