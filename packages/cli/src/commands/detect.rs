use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use quire_paste_from_office::is_word_input;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetectFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Clipboard HTML files to classify
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: DetectFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub path: PathBuf,
    pub word: bool,
}

pub fn detect(args: DetectArgs) -> Result<()> {
    let detections = args
        .inputs
        .iter()
        .map(|path| {
            let html = fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            Ok(Detection {
                path: path.clone(),
                word: is_word_input(Some(&html)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    match args.format {
        DetectFormat::Json => println!("{}", serde_json::to_string_pretty(&detections)?),
        DetectFormat::Text => {
            for detection in &detections {
                if detection.word {
                    println!("  {} {} (Microsoft Word)", "✓".green(), detection.path.display());
                } else {
                    println!("  {} {}", "✗".dimmed(), detection.path.display());
                }
            }
        }
    }

    Ok(())
}
