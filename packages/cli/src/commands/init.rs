use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_core::{EditorConfig, DEFAULT_CONFIG_NAME};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Root names to create, in order
    #[arg(short, long, value_delimiter = ',')]
    pub roots: Vec<String>,

    /// Leave Word paste normalization off
    #[arg(long)]
    pub no_office: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = initial_config(&args);
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Add htmlSupport.allow patterns for the markup to keep");
    println!("  2. Run: quire paste clipboard.html");

    Ok(())
}

fn initial_config(args: &InitArgs) -> EditorConfig {
    let mut config = EditorConfig::default();
    if !args.roots.is_empty() {
        config.roots = args.roots.clone();
    }
    config.paste_from_office.enabled = !args.no_office;
    config
}
