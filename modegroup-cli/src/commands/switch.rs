//! Dry-run switching against an in-memory host

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::Context;

#[derive(Args)]
pub struct SwitchArgs {
    /// Mode groups to switch to, in order
    #[arg(required = true)]
    pub modes: Vec<String>,

    /// Print the switch reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail loads of plugin files missing from the plugins directory
    #[arg(long)]
    pub strict_files: bool,
}

pub fn run(ctx: &Context, args: SwitchArgs) -> Result<()> {
    let host = ctx.dry_run_host(args.strict_files);
    let mut engine = ctx.engine(host.clone())?;

    let mut reports = Vec::with_capacity(args.modes.len());
    for mode in &args.modes {
        let report = engine.switch_to(mode)?;
        if !args.json {
            print!("{report}");
        }
        reports.push(report);
    }

    if args.json {
        let out = json!({
            "reports": reports,
            "current": engine.current_mode(),
            "loaded": host.loaded_paths(),
            "commands": host.submitted(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("Current mode group: {}", engine.current_mode().unwrap_or("none"));
    println!("Loaded plugins:");
    for path in host.loaded_paths() {
        println!("  {path}");
    }
    let commands = host.submitted();
    if !commands.is_empty() {
        println!("Submitted commands:");
        for command in commands {
            println!("  {command}");
        }
    }
    Ok(())
}
