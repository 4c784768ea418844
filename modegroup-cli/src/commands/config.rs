use anyhow::{Result, bail};
use clap::{Args, Subcommand};

use super::Context;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show effective settings (file plus flags)
    Show,
    /// Show settings and host file paths
    Path,
    /// Write the effective settings to the settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(ctx: &Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Path => show_paths(ctx),
        ConfigCommands::Init { force } => init_config(ctx, force),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let toml_str = toml::to_string_pretty(&ctx.config)?;
    println!("{}", toml_str);
    Ok(())
}

fn show_paths(ctx: &Context) -> Result<()> {
    let layout = ctx.config.layout();
    println!("Settings:    {}", ctx.settings_path.display());
    println!("Host root:   {}", layout.root().display());
    println!("Mode groups: {}", layout.mode_config().display());
    println!("Plugins:     {}", layout.plugins_dir().display());
    Ok(())
}

fn init_config(ctx: &Context, force: bool) -> Result<()> {
    if ctx.settings_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            ctx.settings_path.display()
        );
    }
    ctx.config.save(&ctx.settings_path)?;
    println!("Wrote {}", ctx.settings_path.display());
    Ok(())
}
