use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use quire_engine::dev_utils::{get_view_data, set_view_data};
use quire_engine::{
    DomEvent, DomMutation, MemorySurface, Priority, ViewEvent, ViewFragment, ViewMutation,
    ViewNode, ViewTree, INLINE_FILLER,
};
use tracing::warn;

const ROOT: &str = "editor";

/// Caret between two bold runs, the case that needs an inline filler
const DEFAULT_NOTATION: &str = "<container:p><attribute:strong>foo</attribute:strong>[]<attribute:strong>bar</attribute:strong></container:p>";

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Starting view in view notation; `[]` marks the caret
    #[arg(long, default_value = DEFAULT_NOTATION)]
    pub notation: String,

    /// Text typed at the caret
    #[arg(long, default_value = "x")]
    pub text: String,
}

/// What the demo saw at each step
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub view_before: String,
    pub dom_before: String,
    pub dom_after: String,
    pub view_after: String,
}

pub fn demo(args: DemoArgs) -> Result<()> {
    let report = run_demo(&args.notation, &args.text)?;

    println!("{}", "View".bright_blue().bold());
    println!("  {}", report.view_before);
    println!("{}", "Rendered".bright_blue().bold());
    println!("  {}", report.dom_before);
    println!(
        "{} {}",
        "Typed".bright_blue().bold(),
        format!("{:?}", args.text).bright_white()
    );
    println!("  {}", report.dom_after);
    println!("  {}", report.view_after);

    Ok(())
}

/// Render `notation`, then type `text` into the DOM at the rendered caret
/// and let the view pick it up
pub fn run_demo(notation: &str, text: &str) -> Result<DemoReport> {
    let mut tree = ViewTree::with_default_observers();
    let surface = MemorySurface::default();
    tree.create_root(surface.clone(), ROOT)?;
    set_view_data(tree.state_mut(), ROOT, notation)?;
    tree.render()?;

    let view_before = get_view_data(tree.state(), ROOT, true)?;
    let dom_before = show_filler(&surface.to_html());

    tree.on("mutations", Priority::NORMAL, |_, state, event| {
        let ViewEvent::Mutations { mutations, .. } = event else {
            return;
        };
        for mutation in mutations.iter() {
            if let ViewMutation::FillerText { text, .. } = mutation {
                let fragment = ViewFragment::from_children(vec![ViewNode::text(text.clone())]);
                if let Err(err) = state.insert_fragment_at_selection(fragment) {
                    warn!(%err, "Cannot insert typed text");
                }
            }
        }
    });

    let caret = surface
        .selection()
        .ok_or_else(|| anyhow!("Nothing is selected in the rendered view"))?;
    if !surface.to_html().contains(INLINE_FILLER) {
        return Err(anyhow!("The caret does not need an inline filler here"));
    }
    tree.dispatch(DomEvent::Mutations {
        root: ROOT.to_string(),
        mutations: vec![DomMutation::Text {
            path: caret.anchor.path,
            data: format!("{}{}", INLINE_FILLER, text),
        }],
    })?;

    let report = DemoReport {
        view_before,
        dom_before,
        dom_after: show_filler(&surface.to_html()),
        view_after: get_view_data(tree.state(), ROOT, true)?,
    };
    tree.destroy();
    Ok(report)
}

/// Make the invisible filler readable
fn show_filler(html: &str) -> String {
    html.replace(INLINE_FILLER, "{filler}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_into_filler() {
        let report = run_demo(DEFAULT_NOTATION, "x").unwrap();

        assert_eq!(
            report.dom_before,
            "<p><strong>foo</strong>{filler}<strong>bar</strong></p>"
        );
        assert_eq!(
            report.dom_after,
            "<p><strong>foo</strong>x<strong>bar</strong></p>"
        );
        assert_eq!(
            report.view_after,
            "<container:p><attribute:strong>foo</attribute:strong>x[]<attribute:strong>bar</attribute:strong></container:p>"
        );
    }

    #[test]
    fn test_notation_without_caret() {
        assert!(run_demo("<container:p>foo</container:p>", "x").is_err());
    }

    #[test]
    fn test_caret_in_text_needs_no_filler() {
        assert!(run_demo("<container:p>fo{}o</container:p>", "x").is_err());
    }
}
