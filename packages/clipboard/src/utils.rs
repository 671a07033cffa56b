//! Conversions between clipboard payloads and HTML

use quire_engine::html::escape_text;
use quire_engine::{ElementKind, ViewNode};
use regex::Regex;
use std::sync::LazyLock;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

static APPLE_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span(?: class="Apple-converted-space")?>(\s+)</span>"#)
        .expect("apple space pattern is valid")
});

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n\r?\n").expect("paragraph pattern is valid"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("line break pattern is valid"));

static LEADING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s").expect("leading space pattern is valid"));

static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s$").expect("trailing space pattern is valid"));

static DOUBLE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\s").expect("double space pattern is valid"));

/// Elements separated by a single line break in plain text
const SMALL_PADDING_ELEMENTS: &[&str] = &["figcaption", "li"];

/// Clean up HTML put on the clipboard by browsers and office suites.
///
/// Comments (including the `StartFragment` / `EndFragment` markers) are
/// removed, and spans that only wrap whitespace are unwrapped. A span
/// holding a single whitespace character becomes a plain space.
pub fn normalize_clipboard_html(html: &str) -> String {
    let unwrapped = APPLE_SPACE.replace_all(html, |caps: &regex::Captures| {
        let spaces = &caps[1];
        if spaces.chars().count() == 1 {
            " ".to_string()
        } else {
            spaces.to_string()
        }
    });
    COMMENT.replace_all(&unwrapped, "").into_owned()
}

/// Convert plain text into HTML that keeps its visual layout.
///
/// Blank lines separate paragraphs, single newlines become `<br>`, tabs
/// become four spaces and runs of spaces are kept with `&nbsp;`.
pub fn plain_text_to_html(text: &str) -> String {
    let escaped = escape_text(text);
    let html = PARAGRAPH_BREAK.replace_all(&escaped, "</p><p>");
    let html = LINE_BREAK.replace_all(&html, "<br>");
    let html = html.replace('\t', "    ");
    let html = LEADING_SPACE.replace(&html, "&nbsp;");
    let html = TRAILING_SPACE.replace(&html, "&nbsp;");
    let html = DOUBLE_SPACE.replace_all(&html, " &nbsp;").into_owned();

    if html.contains("</p><p>") || html.contains("<br>") {
        format!("<p>{}</p>", html)
    } else {
        html
    }
}

/// Plain text rendition of view nodes, used for `text/plain` output
pub fn view_to_plain_text(nodes: &[ViewNode]) -> String {
    let mut text = String::new();
    let mut previous: Option<&ViewNode> = None;

    for node in nodes {
        if let Some(previous) = previous {
            if is_container(previous) || is_container(node) {
                if is_small_padding(previous) || is_small_padding(node) {
                    text.push('\n');
                } else {
                    text.push_str("\n\n");
                }
            }
        }
        text.push_str(&node_to_plain_text(node));
        previous = Some(node);
    }

    text
}

fn node_to_plain_text(node: &ViewNode) -> String {
    match node {
        ViewNode::Text(text) => text.data().to_string(),
        ViewNode::Element(element) if element.is("img") => {
            element.get_attribute("alt").unwrap_or_default().to_string()
        }
        ViewNode::Element(element) if element.is("br") => "\n".to_string(),
        ViewNode::Element(element) => view_to_plain_text(element.children()),
    }
}

fn is_container(node: &ViewNode) -> bool {
    matches!(node, ViewNode::Element(element) if element.kind() == ElementKind::Container)
}

fn is_small_padding(node: &ViewNode) -> bool {
    matches!(node, ViewNode::Element(element) if SMALL_PADDING_ELEMENTS.contains(&element.name()))
}
