use super::parser::HtmlParser;
use super::serializer::to_html;
use crate::error::HtmlParseError;
use crate::view::{ElementKind, ViewFragment, ViewNode};
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n\r\x0C]+").expect("whitespace pattern is valid"));

/// Elements whose whitespace is significant
const PRESERVE_WHITESPACE: &[&str] = &["pre", "textarea", "style", "script"];

/// Converts between HTML data strings and view fragments
#[derive(Debug, Clone, Default)]
pub struct HtmlDataProcessor {
    parser: HtmlParser,
}

impl HtmlDataProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(parser: HtmlParser) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &HtmlParser {
        &self.parser
    }

    /// Parse HTML and normalize insignificant whitespace the way a browser
    /// renders it: runs collapse to one space and whitespace touching a
    /// block boundary disappears.
    pub fn to_view(&self, html: &str) -> Result<ViewFragment, HtmlParseError> {
        let mut fragment = self.parser.parse(html)?;
        normalize_whitespace(fragment.children_mut(), true);
        Ok(fragment)
    }

    pub fn to_data(&self, nodes: &[ViewNode]) -> String {
        to_html(nodes)
    }
}

fn is_block(node: &ViewNode) -> bool {
    matches!(node, ViewNode::Element(element) if matches!(element.kind(), ElementKind::Container | ElementKind::Root))
}

pub(crate) fn normalize_whitespace(children: &mut Vec<ViewNode>, in_block: bool) {
    for child in children.iter_mut() {
        match child {
            ViewNode::Text(text) => {
                let collapsed = WHITESPACE.replace_all(text.data(), " ").into_owned();
                text.set_data(collapsed);
            }
            ViewNode::Element(element) => {
                if PRESERVE_WHITESPACE.contains(&element.name()) {
                    continue;
                }
                let block = matches!(element.kind(), ElementKind::Container | ElementKind::Root);
                normalize_whitespace(element.children_mut(), block);
            }
        }
    }

    if !in_block {
        return;
    }

    let original = std::mem::take(children);
    let count = original.len();
    let blocks: Vec<bool> = original.iter().map(is_block).collect();

    for (index, mut node) in original.into_iter().enumerate() {
        if let ViewNode::Text(text) = &mut node {
            let after_block = index == 0 || blocks[index - 1];
            let before_block = index + 1 == count || blocks[index + 1];

            let mut data = text.data();
            if after_block {
                data = data.trim_start_matches(' ');
            }
            if before_block {
                data = data.trim_end_matches(' ');
            }

            if data.is_empty() {
                continue;
            }
            let data = data.to_string();
            text.set_data(data);
        }
        children.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_between_blocks_is_dropped() {
        let processor = HtmlDataProcessor::new();
        let fragment = processor.to_view("\n<p>  a\n  b </p>\n\n<p>c</p>\n").unwrap();

        assert_eq!(fragment.child_count(), 2);
        assert_eq!(processor.to_data(fragment.children()), "<p>a b</p><p>c</p>");
    }

    #[test]
    fn test_space_between_inline_elements_is_kept() {
        let processor = HtmlDataProcessor::new();
        let fragment = processor.to_view("<p><b>x</b> <i>y</i></p>").unwrap();
        assert_eq!(processor.to_data(fragment.children()), "<p><b>x</b> <i>y</i></p>");
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let processor = HtmlDataProcessor::new();
        let fragment = processor.to_view("<pre>a\n  b</pre>").unwrap();
        assert_eq!(fragment.text_content(), "a\n  b");
    }

    #[test]
    fn test_nbsp_is_not_collapsed() {
        let processor = HtmlDataProcessor::new();
        let fragment = processor.to_view("<p>&nbsp;x&nbsp;</p>").unwrap();
        assert_eq!(fragment.text_content(), "\u{a0}x\u{a0}");
    }
}
