use super::entities::{escape_attribute, escape_text};
use crate::view::{is_void_element, ElementKind, ViewElement, ViewNode};

/// Serialize nodes to an HTML string.
///
/// Attributes are written in sorted order so that equal views always
/// produce equal strings.
pub fn to_html(nodes: &[ViewNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, false, &mut out);
    }
    out
}

pub fn element_to_html(element: &ViewElement) -> String {
    let mut out = String::new();
    write_element(element, &mut out);
    out
}

fn write_node(node: &ViewNode, raw: bool, out: &mut String) {
    match node {
        ViewNode::Text(text) if raw => out.push_str(text.data()),
        ViewNode::Text(text) => out.push_str(&escape_text(text.data())),
        ViewNode::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &ViewElement, out: &mut String) {
    out.push('<');
    out.push_str(element.name());

    for (key, value) in element.rendered_attributes() {
        out.push(' ');
        out.push_str(&key);
        out.push_str("=\"");
        out.push_str(&escape_attribute(&value));
        out.push('"');
    }
    out.push('>');

    if element.kind() == ElementKind::Empty || is_void_element(element.name()) {
        return;
    }

    let raw = matches!(element.name(), "style" | "script");
    for child in element.children() {
        write_node(child, raw, out);
    }

    out.push_str("</");
    out.push_str(element.name());
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_elements_and_text() {
        let p = ViewElement::container("p")
            .with_attribute("dir", "ltr")
            .with_class("lead")
            .with_style("color", "red")
            .with_child(ViewNode::text("a < b"))
            .with_child(ViewElement::empty_element("br"))
            .with_child(ViewElement::attribute_element("b").with_child(ViewNode::text("x")));

        assert_eq!(
            element_to_html(&p),
            "<p class=\"lead\" dir=\"ltr\" style=\"color:red\">a &lt; b<br><b>x</b></p>"
        );
    }

    #[test]
    fn test_style_content_is_not_escaped() {
        let style = ViewElement::container("style").with_child(ViewNode::text("p > b {}"));
        assert_eq!(element_to_html(&style), "<style>p > b {}</style>");
    }

    #[test]
    fn test_nbsp_is_written_as_entity() {
        assert_eq!(to_html(&[ViewNode::text("a\u{a0}b")]), "a&nbsp;b");
    }
}
