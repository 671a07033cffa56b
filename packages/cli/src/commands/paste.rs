use crate::config::load_config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use quire_core::{Editor, EditorConfig, PluginEntry};
use quire_engine::dev_utils::get_view_data;
use quire_engine::{DataTransfer, DomEvent, Position, Selection, ViewElement};
use quire_html_support::GeneralHtmlSupport;
use quire_paste_from_office::PasteFromOffice;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct PasteArgs {
    /// File holding the clipboard content
    pub input: PathBuf,

    /// Treat the input as text/plain instead of text/html
    #[arg(long)]
    pub plain: bool,

    /// Config file (defaults to quire.config.json in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the resulting view in view notation instead of HTML
    #[arg(long)]
    pub notation: bool,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn paste(args: PasteArgs, cwd: &Path) -> Result<()> {
    let config = load_config(cwd, args.config.as_deref())?;
    let content = fs::read_to_string(&args.input)
        .with_context(|| format!("Cannot read {}", args.input.display()))?;
    let mime = if args.plain { "text/plain" } else { "text/html" };

    let result = run_paste(config, mime, &content, args.notation)?;

    match args.output {
        Some(path) => {
            fs::write(&path, &result)?;
            eprintln!("  {} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", result),
    }

    Ok(())
}

/// Paste `content` into an empty editor and return what ends up in the
/// first root
pub fn run_paste(config: EditorConfig, mime: &str, content: &str, notation: bool) -> Result<String> {
    let root = config
        .roots
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("The config defines no roots"))?;

    let mut editor = Editor::create(
        config,
        &[
            PluginEntry::of::<PasteFromOffice>(),
            PluginEntry::of::<GeneralHtmlSupport>(),
        ],
    )?;

    let root_id = editor
        .view()
        .root(&root)
        .map(ViewElement::id)
        .ok_or_else(|| anyhow!("Root '{}' was not created", root))?;
    editor
        .view_mut()
        .set_selection(Selection::collapsed(Position::new(root_id, 0)))?;

    info!(root = %root, mime, bytes = content.len(), "Pasting");
    editor.view_mut().dispatch(DomEvent::Paste {
        root: root.clone(),
        data_transfer: DataTransfer::new().with_data(mime, content),
    })?;

    let result = if notation {
        get_view_data(editor.view().state(), &root, true)?
    } else {
        editor.get_data(&root)?
    };

    editor.destroy();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_paste() {
        let html = r#"<html><head><meta name=Generator content="Microsoft Word 15">
<style>@list l0:level1 { mso-level-number-format:bullet; }</style></head>
<body><p style='mso-list:l0 level1 lfo1'><span style='mso-list:Ignore'>·</span>One</p></body></html>"#;

        let result = run_paste(EditorConfig::default(), "text/html", html, false).unwrap();
        assert_eq!(result, "<ul><li>One</li></ul>");
    }

    #[test]
    fn test_plain_text_paste_in_notation() {
        let result = run_paste(EditorConfig::default(), "text/plain", "a\n\nb", true).unwrap();
        assert_eq!(
            result,
            "<container:p>a</container:p><container:p>b</container:p>[]"
        );
    }

    #[test]
    fn test_config_without_roots() {
        let config = EditorConfig {
            roots: Vec::new(),
            ..EditorConfig::default()
        };
        assert!(run_paste(config, "text/html", "<p>x</p>", false).is_err());
    }
}
