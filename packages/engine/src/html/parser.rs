//! Fail-soft HTML tree builder.
//!
//! Any input produces a fragment: unknown end tags are ignored, unclosed
//! elements are closed at the end of input and a handful of implied end
//! tags (`p`, `li`, table cells) are inserted the way browsers do. The only
//! hard failure is nesting deeper than the configured limit, unless the
//! parser flattens past it (see [`HtmlParser::flatten_past_limit`]).

use super::entities::decode_entities;
use super::tokenizer::{end_tag_name, parse_start_tag, HtmlToken};
use crate::error::HtmlParseError;
use crate::view::{is_void_element, ElementKind, ViewElement, ViewFragment, ViewNode};
use logos::Logos;
use tracing::trace;

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Elements whose content is taken verbatim up to the matching end tag
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Start tags that implicitly close an open `p`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

/// Elements that stop the search for an implicitly closed element
const SCOPE_BOUNDARIES: &[&str] = &["html", "body", "table", "td", "th", "caption", "button"];

#[derive(Debug, Clone)]
pub struct HtmlParser {
    max_depth: usize,
    flatten: bool,
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlParser {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            flatten: false,
        }
    }

    /// Instead of failing, drop the tags of elements past the depth limit
    /// and keep their content at the deepest allowed level
    pub fn flatten_past_limit(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Build a view fragment from an HTML string
    pub fn parse(&self, html: &str) -> Result<ViewFragment, HtmlParseError> {
        let mut builder = TreeBuilder::default();
        let mut lexer = HtmlToken::lexer(html);
        // Names of flattened elements whose end tag is still to come
        let mut flattened: Vec<String> = Vec::new();

        while let Some(token) = lexer.next() {
            match token {
                Ok(HtmlToken::StartTag(raw)) => {
                    let tag = parse_start_tag(raw);
                    builder.close_implied(&tag.name);

                    let mut element =
                        ViewElement::new(ElementKind::for_html_name(&tag.name), tag.name.as_str());
                    for (key, value) in tag.attributes {
                        element.set_attribute(key, decode_entities(value));
                    }

                    if tag.self_closing || is_void_element(&tag.name) {
                        builder.append(ViewNode::Element(element));
                        continue;
                    }

                    let depth = builder.open.len() + 1;
                    if depth > self.max_depth {
                        if !self.flatten {
                            return Err(HtmlParseError::NestingTooDeep {
                                depth,
                                limit: self.max_depth,
                            });
                        }
                        trace!(tag = %tag.name, depth, "Flattening element past the depth limit");
                        flattened.push(tag.name);
                        continue;
                    }
                    builder.open.push(element);

                    if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                        let rest = lexer.remainder();
                        let closing = format!("</{}", tag.name);
                        let end = rest
                            .to_ascii_lowercase()
                            .find(&closing)
                            .unwrap_or(rest.len());

                        if end > 0 {
                            builder.append(ViewNode::text(&rest[..end]));
                        }
                        lexer.bump(end);
                    }
                }
                Ok(HtmlToken::EndTag(raw)) => {
                    let name = end_tag_name(raw);
                    if let Some(index) = flattened.iter().rposition(|open| *open == name) {
                        flattened.remove(index);
                        continue;
                    }
                    if name == "p" && builder.find_open(&["p"], SCOPE_BOUNDARIES).is_none() {
                        // Browsers turn a stray `</p>` into an empty paragraph
                        builder.append(ViewNode::Element(ViewElement::container("p")));
                        continue;
                    }
                    match builder.find_open(&[name.as_str()], &[]) {
                        Some(index) => builder.close_to(index),
                        None => trace!(tag = %name, "Ignoring stray end tag"),
                    }
                }
                Ok(HtmlToken::Text(text)) => {
                    builder.append(ViewNode::text(decode_entities(text)));
                }
                Ok(HtmlToken::Lt) => builder.append(ViewNode::text("<")),
                Ok(HtmlToken::Comment(_))
                | Ok(HtmlToken::Declaration(_))
                | Ok(HtmlToken::ProcessingInstruction(_)) => {}
                Err(_) => builder.append(ViewNode::text(lexer.slice())),
            }
        }

        Ok(builder.finish())
    }
}

#[derive(Default)]
struct TreeBuilder {
    open: Vec<ViewElement>,
    top: Vec<ViewNode>,
}

impl TreeBuilder {
    fn append(&mut self, node: ViewNode) {
        let target = match self.open.last_mut() {
            Some(parent) => parent.children_mut(),
            None => &mut self.top,
        };
        append_merging_text(target, node);
    }

    /// Index of the nearest open element named any of `names`, not crossing `boundaries`
    fn find_open(&self, names: &[&str], boundaries: &[&str]) -> Option<usize> {
        for (index, element) in self.open.iter().enumerate().rev() {
            if names.contains(&element.name()) {
                return Some(index);
            }
            if boundaries.contains(&element.name()) {
                return None;
            }
        }
        None
    }

    /// Close every open element from the top down to (and including) `index`
    fn close_to(&mut self, index: usize) {
        while self.open.len() > index {
            if let Some(element) = self.open.pop() {
                self.append(ViewNode::Element(element));
            }
        }
    }

    fn close_implied(&mut self, name: &str) {
        let implied = if CLOSES_PARAGRAPH.contains(&name) {
            self.find_open(&["p"], SCOPE_BOUNDARIES)
        } else {
            match name {
                "li" => self.find_open(&["li"], &["ul", "ol", "table", "td", "th"]),
                "dt" | "dd" => self.find_open(&["dt", "dd"], &["dl", "table"]),
                "tr" => self.find_open(&["tr"], &["table", "tbody", "thead", "tfoot"]),
                "td" | "th" => self.find_open(&["td", "th"], &["tr", "table"]),
                "tbody" | "thead" | "tfoot" => {
                    self.find_open(&["tbody", "thead", "tfoot"], &["table"])
                }
                "option" => self.find_open(&["option"], &["select"]),
                _ => None,
            }
        };

        if let Some(index) = implied {
            self.close_to(index);
        }
    }

    fn finish(mut self) -> ViewFragment {
        self.close_to(0);
        ViewFragment::from_children(self.top)
    }
}

pub(crate) fn append_merging_text(children: &mut Vec<ViewNode>, node: ViewNode) {
    if let ViewNode::Text(text) = &node {
        if let Some(ViewNode::Text(last)) = children.last_mut() {
            let merged = format!("{}{}", last.data(), text.data());
            last.set_data(merged);
            return;
        }
    }
    children.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> ViewFragment {
        HtmlParser::new().parse(html).unwrap()
    }

    fn element(node: &ViewNode) -> &ViewElement {
        node.as_element().unwrap()
    }

    #[test]
    fn test_parse_nested_elements() {
        let fragment = parse("<p class=\"lead\">Hello <strong>world</strong></p>");
        assert_eq!(fragment.child_count(), 1);

        let p = element(&fragment.children()[0]);
        assert_eq!(p.name(), "p");
        assert_eq!(p.kind(), ElementKind::Container);
        assert!(p.has_class("lead"));
        assert_eq!(p.child_count(), 2);
        assert_eq!(element(&p.children()[1]).kind(), ElementKind::Attribute);
        assert_eq!(p.text_content(), "Hello world");
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let fragment = parse("<p>a<br>b<o:p/>c</p>");
        let p = element(&fragment.children()[0]);
        assert_eq!(p.child_count(), 5);
        assert_eq!(element(&p.children()[1]).kind(), ElementKind::Empty);
        assert_eq!(element(&p.children()[3]).name(), "o:p");
    }

    #[test]
    fn test_unclosed_elements_are_closed_at_end() {
        let fragment = parse("<div><p>text");
        let div = element(&fragment.children()[0]);
        assert_eq!(element(&div.children()[0]).text_content(), "text");
    }

    #[test]
    fn test_paragraph_closed_by_block() {
        let fragment = parse("<p>one<p>two<div>three</div>");
        let names: Vec<_> = fragment
            .children()
            .iter()
            .map(|n| element(n).name().to_string())
            .collect();
        assert_eq!(names, vec!["p", "p", "div"]);
    }

    #[test]
    fn test_list_items_close_each_other() {
        let fragment = parse("<ul><li>a<li>b</ul>");
        let ul = element(&fragment.children()[0]);
        assert_eq!(ul.child_count(), 2);
    }

    #[test]
    fn test_stray_end_tag_is_ignored() {
        let fragment = parse("<p>a</span>b</p>");
        let p = element(&fragment.children()[0]);
        assert_eq!(p.child_count(), 1);
        assert_eq!(p.text_content(), "ab");
    }

    #[test]
    fn test_stray_paragraph_end_tag_becomes_empty_paragraph() {
        let fragment = parse("text</p><p>next</p>");
        assert_eq!(fragment.child_count(), 3);
        let empty = element(&fragment.children()[1]);
        assert!(empty.is("p"));
        assert!(empty.is_empty());

        // A `</p>` closing an open paragraph is not stray
        assert_eq!(parse("<p>a</p>").child_count(), 1);
    }

    #[test]
    fn test_entities_are_decoded() {
        let fragment = parse("<p title=\"a &amp; b\">1 &lt; 2&nbsp;</p>");
        let p = element(&fragment.children()[0]);
        assert_eq!(p.get_attribute("title"), Some("a & b"));
        assert_eq!(p.text_content(), "1 < 2\u{a0}");
    }

    #[test]
    fn test_style_content_is_raw() {
        let fragment = parse("<style>p > b { color: red } /* <p> */</style><p>x</p>");
        let style = element(&fragment.children()[0]);
        assert_eq!(style.text_content(), "p > b { color: red } /* <p> */");
        assert_eq!(fragment.child_count(), 2);
    }

    #[test]
    fn test_comments_are_dropped() {
        let fragment = parse("<!--StartFragment--><p>x</p><!--EndFragment-->");
        assert_eq!(fragment.child_count(), 1);
    }

    #[test]
    fn test_nesting_limit() {
        let html = "<div>".repeat(10);
        let result = HtmlParser::with_max_depth(5).parse(&html);
        assert_eq!(
            result,
            Err(HtmlParseError::NestingTooDeep { depth: 6, limit: 5 })
        );
        assert!(HtmlParser::with_max_depth(10).parse(&html).is_ok());
    }

    #[test]
    fn test_flattening_past_the_nesting_limit() {
        let html = format!("{}deep{}<p>after</p>", "<div>".repeat(4), "</div>".repeat(4));
        let fragment = HtmlParser::with_max_depth(2)
            .flatten_past_limit()
            .parse(&html)
            .unwrap();

        assert_eq!(fragment.child_count(), 2);
        let outer = element(&fragment.children()[0]);
        let inner = element(&outer.children()[0]);
        assert!(inner.is("div"));
        assert_eq!(inner.children().len(), 1);
        assert_eq!(inner.text_content(), "deep");
        assert!(element(&fragment.children()[1]).is("p"));
    }

    #[test]
    fn test_malformed_input_never_fails() {
        for html in ["<", "<<p>>", "</>", "<p title=\"x>", "&&&", "<!--", "<![if"] {
            assert!(HtmlParser::new().parse(html).is_ok(), "failed on {:?}", html);
        }
    }
}
