use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "modegroup", about = "Switch game server plugin sets by named mode group")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine settings file [default: ~/.config/modegroup/settings.toml]
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Host root directory, overriding the settings file
    #[arg(long, global = true, value_name = "PATH")]
    root: Option<PathBuf>,

    /// Mode group config file, overriding the settings file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured mode groups
    List,
    /// Show one mode group as parsed
    Show {
        /// Mode group name
        mode: String,
    },
    /// Print the load order a switch would use
    Plan {
        /// Mode group name
        mode: String,
    },
    /// Dry-run a sequence of switches against an in-memory host
    Switch(commands::switch::SwitchArgs),
    /// Read `modegroup ...` console lines from stdin
    Console,
    /// Manage engine settings
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::load(cli.settings, cli.root, cli.config)?;

    match cli.command {
        Commands::List => commands::modes::list(&ctx),
        Commands::Show { mode } => commands::modes::show(&ctx, &mode),
        Commands::Plan { mode } => commands::modes::plan(&ctx, &mode),
        Commands::Switch(args) => commands::switch::run(&ctx, args),
        Commands::Console => commands::console::run(&ctx),
        Commands::Config(args) => commands::config::run(&ctx, args),
    }
}
