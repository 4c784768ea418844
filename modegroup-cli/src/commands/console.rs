//! Line-oriented console: feeds `modegroup ...` lines from stdin to the engine

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Result;
use modegroup_core::console::{self, ConsoleCommand};

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let host = ctx.dry_run_host(false);
    let mut engine = ctx.engine(host)?;
    engine.subscribe(Arc::new(|previous: Option<&str>, current: &str| {
        tracing::info!(
            previous = previous.unwrap_or("none"),
            current = %current,
            "Mode group changed"
        );
    }));

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let Some(command) = ConsoleCommand::parse_line(line) else {
            println!("Unknown command \"{line}\"");
            continue;
        };
        for out in console::dispatch(&mut engine, command).lines {
            println!("{out}");
        }
    }

    engine.shutdown();
    Ok(())
}
