mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{demo, detect, init, paste, DemoArgs, DetectArgs, InitArgs, PasteArgs};

/// Quire CLI - run clipboard content through the editor's paste pipeline
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default quire.config.json
    Init(InitArgs),

    /// Paste a clipboard file into an empty editor and print the result
    Paste(PasteArgs),

    /// Report which files look like Microsoft Word clipboard content
    Detect(DetectArgs),

    /// Show the inline filler at work while typing between bold runs
    Demo(DemoArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Paste(args) => paste(args, &cwd),
            Command::Detect(args) => detect(args),
            Command::Demo(args) => demo(args),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
