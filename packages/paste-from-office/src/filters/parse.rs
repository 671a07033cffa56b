//! Splitting a pasted HTML document into its body and its stylesheets

use crate::error::PasteResult;
use quire_engine::html::to_html;
use quire_engine::{HtmlDataProcessor, HtmlParser, ViewFragment, ViewNode};

/// Elements of the document head, dropped when the input has no `<body>`
const HEAD_ELEMENTS: &[&str] = &["head", "meta", "title", "link", "style", "script", "xml"];

/// A pasted document taken apart
#[derive(Debug, Clone)]
pub struct ParsedHtml {
    /// Content of `<body>`
    pub body: ViewFragment,
    /// `body` serialized back to HTML
    pub body_string: String,
    /// Text of each `<style>` element, in document order
    pub styles: Vec<String>,
    /// All of `styles` joined
    pub styles_string: String,
}

/// Parse a full HTML document.
///
/// The body becomes a view fragment with Office `<o:p>` placeholders
/// unwrapped. Input without a `<body>` is treated as a body fragment once
/// head-only elements are removed.
pub fn parse_html(html: &str, max_depth: usize) -> PasteResult<ParsedHtml> {
    let processor = HtmlDataProcessor::with_parser(HtmlParser::with_max_depth(max_depth));
    let document = processor.to_view(html)?;

    let mut styles = Vec::new();
    collect_styles(document.children(), &mut styles);

    let mut children = document.into_children();
    let mut body = match take_body(&mut children) {
        Some(body) => body,
        None => strip_head(children),
    };
    unwrap_office_placeholders(&mut body);

    let body = ViewFragment::from_children(body);
    let body_string = to_html(body.children());
    let styles_string = styles.join(" ");

    Ok(ParsedHtml {
        body,
        body_string,
        styles,
        styles_string,
    })
}

fn collect_styles(nodes: &[ViewNode], styles: &mut Vec<String>) {
    for node in nodes {
        if let ViewNode::Element(element) = node {
            if element.is("style") {
                styles.push(element.text_content());
            } else {
                collect_styles(element.children(), styles);
            }
        }
    }
}

fn take_body(nodes: &mut [ViewNode]) -> Option<Vec<ViewNode>> {
    for node in nodes.iter_mut() {
        let ViewNode::Element(element) = node else {
            continue;
        };
        if element.is("body") {
            return Some(element.take_children());
        }
        if let Some(body) = take_body(element.children_mut()) {
            return Some(body);
        }
    }
    None
}

fn strip_head(nodes: Vec<ViewNode>) -> Vec<ViewNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            ViewNode::Element(element) if HEAD_ELEMENTS.contains(&element.name()) => {}
            ViewNode::Element(mut element) if element.is("html") => {
                out.extend(strip_head(element.take_children()));
            }
            node => out.push(node),
        }
    }
    out
}

/// Replace `<o:p>` elements with their content
fn unwrap_office_placeholders(nodes: &mut Vec<ViewNode>) {
    let original = std::mem::take(nodes);
    for node in original {
        match node {
            ViewNode::Element(mut element) if element.is("o:p") => {
                let mut children = element.take_children();
                unwrap_office_placeholders(&mut children);
                nodes.extend(children);
            }
            ViewNode::Element(mut element) => {
                unwrap_office_placeholders(element.children_mut());
                nodes.push(ViewNode::Element(element));
            }
            text => nodes.push(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_engine::html::DEFAULT_MAX_DEPTH;
    use quire_engine::HtmlParseError;
    use crate::error::PasteError;

    const DOCUMENT: &str = r#"<html xmlns:o="urn:schemas-microsoft-com:office:office">
<head>
<meta name=Generator content="Microsoft Word 15">
<style>
p.MsoNormal { margin:0in; }
</style>
<style>@list l0:level1 { mso-level-number-format:bullet; }</style>
</head>
<body lang=EN-US>
<p class=MsoNormal>Hello<o:p></o:p></p>
<p class=MsoNormal><o:p>&nbsp;</o:p></p>
</body>
</html>"#;

    #[test]
    fn test_body_and_styles_are_separated() {
        let parsed = parse_html(DOCUMENT, DEFAULT_MAX_DEPTH).unwrap();

        assert_eq!(parsed.body.child_count(), 2);
        assert_eq!(
            parsed.body_string,
            "<p class=\"MsoNormal\">Hello</p><p class=\"MsoNormal\">&nbsp;</p>"
        );
        assert_eq!(parsed.styles.len(), 2);
        assert!(parsed.styles[0].contains("p.MsoNormal"));
        assert!(parsed.styles_string.contains("@list l0:level1"));
    }

    #[test]
    fn test_fragment_without_body() {
        let parsed = parse_html(
            "<meta charset=utf-8><style>b{}</style><p>x</p>",
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();

        assert_eq!(parsed.body_string, "<p>x</p>");
        assert_eq!(parsed.styles, vec!["b{}".to_string()]);
    }

    #[test]
    fn test_nesting_limit() {
        let html = "<div>".repeat(10);
        let result = parse_html(&html, 4);
        assert_eq!(
            result.unwrap_err(),
            PasteError::Parse(HtmlParseError::NestingTooDeep { depth: 5, limit: 4 })
        );
    }
}
