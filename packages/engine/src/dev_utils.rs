//! # View Notation
//!
//! A compact string form of a view with an embedded selection, used by
//! tests and demos:
//!
//! ```text
//! <container:p><attribute:strong>foo</attribute:strong>[]<attribute:strong>bar</attribute:strong></container:p>
//! <container:p>f{oo</container:p><container:p>ba}r</container:p>
//! ```
//!
//! `[` and `]` mark positions between nodes, `{` and `}` positions inside
//! text. The opening marker is the anchor, the closing one the focus; `[]`
//! and `{}` are carets. The element prefix (`container:`, `attribute:`,
//! `empty:`) picks the element kind; without one the kind follows the
//! HTML element name.

use crate::error::{ViewError, ViewResult};
use crate::html::tokenizer::{end_tag_name, parse_start_tag, HtmlToken};
use crate::selection::{position_key, Position, Selection};
use crate::tree::ViewState;
use crate::view::{ElementKind, NodeId, ViewElement, ViewFragment, ViewNode, ViewText};
use logos::Logos;

/// Result of [`parse_view`]
#[derive(Debug, Clone)]
pub struct ParsedView {
    pub fragment: ViewFragment,
    pub selection: Selection,
}

/// Parse view notation into a fragment and the selection it marks
pub fn parse_view(notation: &str) -> ViewResult<ParsedView> {
    let mut fragment = ViewFragment::new();
    let fragment_id = fragment.id();
    let mut open: Vec<ViewElement> = Vec::new();
    let mut start: Option<Position> = None;
    let mut end: Option<Position> = None;

    let mut lexer = HtmlToken::lexer(notation);
    while let Some(token) = lexer.next() {
        let pos = lexer.span().start;
        let notation_error = |message: String| ViewError::Notation { pos, message };

        match token {
            Ok(HtmlToken::StartTag(raw)) => {
                let tag = parse_start_tag(raw);
                let (kind, name) = split_kind(&tag.name);
                let mut element = ViewElement::new(kind, name);
                for (key, value) in tag.attributes {
                    element.set_attribute(key, value);
                }

                if tag.self_closing {
                    push_node(&mut open, &mut fragment, ViewNode::Element(element));
                } else {
                    open.push(element);
                }
            }
            Ok(HtmlToken::EndTag(raw)) => {
                let raw_name = end_tag_name(raw);
                let (_, name) = split_kind(&raw_name);
                match open.pop() {
                    Some(element) if element.name() == name => {
                        push_node(&mut open, &mut fragment, ViewNode::Element(element));
                    }
                    Some(element) => {
                        return Err(notation_error(format!(
                            "Expected </{}>, found </{}>",
                            element.name(),
                            name
                        )))
                    }
                    None => return Err(notation_error(format!("Unexpected </{}>", name))),
                }
            }
            Ok(HtmlToken::Text(text)) => {
                let mut pending = String::new();
                let mut text_markers: Vec<(char, usize)> = Vec::new();

                for ch in text.chars() {
                    match ch {
                        '[' | ']' => {
                            flush_text(&mut open, &mut fragment, &mut pending, &mut text_markers, &mut start, &mut end)
                                .map_err(notation_error)?;
                            let parent = open.last().map_or(fragment_id, ViewElement::id);
                            let offset = open
                                .last()
                                .map_or(fragment.child_count(), ViewElement::child_count);
                            set_marker(ch == '[', Position::new(parent, offset), &mut start, &mut end)
                                .map_err(notation_error)?;
                        }
                        '{' | '}' => text_markers.push((ch, pending.chars().count())),
                        _ => pending.push(ch),
                    }
                }

                flush_text(&mut open, &mut fragment, &mut pending, &mut text_markers, &mut start, &mut end)
                    .map_err(notation_error)?;
            }
            Ok(HtmlToken::Lt) | Err(_) => {
                return Err(notation_error(format!("Unexpected '{}'", lexer.slice())));
            }
            Ok(_) => {}
        }
    }

    if let Some(element) = open.last() {
        return Err(ViewError::Notation {
            pos: notation.len(),
            message: format!("Unclosed <{}>", element.name()),
        });
    }

    let selection = match (start, end) {
        (None, None) => Selection::empty(),
        (Some(anchor), Some(focus)) => Selection::new(anchor, focus),
        _ => {
            return Err(ViewError::Notation {
                pos: notation.len(),
                message: "Selection is missing its opening or closing marker".to_string(),
            })
        }
    };

    Ok(ParsedView {
        fragment,
        selection,
    })
}

fn split_kind(name: &str) -> (ElementKind, &str) {
    if let Some((prefix, rest)) = name.split_once(':') {
        if let Some(kind) = ElementKind::from_prefix(prefix) {
            return (kind, rest);
        }
    }
    (ElementKind::for_html_name(name), name)
}

fn push_node(open: &mut [ViewElement], fragment: &mut ViewFragment, node: ViewNode) {
    match open.last_mut() {
        Some(parent) => parent.append_child(node),
        None => fragment.append_child(node),
    }
}

fn flush_text(
    open: &mut [ViewElement],
    fragment: &mut ViewFragment,
    pending: &mut String,
    markers: &mut Vec<(char, usize)>,
    start: &mut Option<Position>,
    end: &mut Option<Position>,
) -> Result<(), String> {
    if pending.is_empty() && markers.is_empty() {
        return Ok(());
    }

    let text = ViewText::new(std::mem::take(pending));
    let id = text.id();
    for (marker, offset) in markers.drain(..) {
        set_marker(marker == '{', Position::new(id, offset), start, end)?;
    }
    push_node(open, fragment, ViewNode::Text(text));
    Ok(())
}

fn set_marker(
    opening: bool,
    position: Position,
    start: &mut Option<Position>,
    end: &mut Option<Position>,
) -> Result<(), String> {
    let slot = if opening { start } else { end };
    if slot.is_some() {
        return Err("Selection marker used twice".to_string());
    }
    *slot = Some(position);
    Ok(())
}

/// Render `children` of the container `container` in view notation.
///
/// With `show_kind` set every element carries its kind prefix.
pub fn stringify_view(
    container: NodeId,
    children: &[ViewNode],
    selection: &Selection,
    show_kind: bool,
) -> String {
    let markers = ordered_markers(container, children, selection);
    let mut out = String::new();
    write_children(container, children, &markers, show_kind, &mut out);
    out
}

/// Shorthand for a fragment with no kind prefixes
pub fn stringify_fragment(fragment: &ViewFragment, selection: &Selection) -> String {
    stringify_view(fragment.id(), fragment.children(), selection, false)
}

/// Shorthand for an element's content
pub fn stringify_element(element: &ViewElement, selection: &Selection, show_kind: bool) -> String {
    stringify_view(element.id(), element.children(), selection, show_kind)
}

/// Replace the content of `root` with parsed notation and apply the
/// selection it marks
pub fn set_view_data(state: &mut ViewState, root: &str, notation: &str) -> ViewResult<()> {
    let parsed = parse_view(notation)?;
    let fragment_id = parsed.fragment.id();

    let element = state
        .root_mut(root)
        .ok_or_else(|| ViewError::RootNotFound(root.to_string()))?;
    let root_id = element.id();
    element.take_children();
    element.append_children(parsed.fragment.into_children());

    // Positions directly in the fragment belong to the root now
    let rebase = |position: Position| {
        if position.parent == fragment_id {
            Position::new(root_id, position.offset)
        } else {
            position
        }
    };
    let selection = match (parsed.selection.anchor(), parsed.selection.focus()) {
        (Some(anchor), Some(focus)) => Selection::new(rebase(anchor), rebase(focus)),
        _ => Selection::empty(),
    };
    state.set_selection(selection)
}

/// Content of `root` in view notation, with the tree selection
pub fn get_view_data(state: &ViewState, root: &str, show_kind: bool) -> ViewResult<String> {
    let element = state
        .root(root)
        .ok_or_else(|| ViewError::RootNotFound(root.to_string()))?;
    Ok(stringify_element(element, state.selection(), show_kind))
}

struct Marker {
    position: Position,
    text: &'static str,
}

fn ordered_markers(container: NodeId, children: &[ViewNode], selection: &Selection) -> Vec<Marker> {
    let (Some(anchor), Some(focus)) = (selection.anchor(), selection.focus()) else {
        return Vec::new();
    };

    let in_text = |position: Position| find_text(children, position.parent).is_some();

    if anchor == focus {
        let text = if in_text(anchor) { "{}" } else { "[]" };
        return vec![Marker { position: anchor, text }];
    }

    let (first, last) = match (
        position_key(container, children, anchor),
        position_key(container, children, focus),
    ) {
        (Some(a), Some(f)) if f < a => (focus, anchor),
        _ => (anchor, focus),
    };

    vec![
        Marker {
            position: first,
            text: if in_text(first) { "{" } else { "[" },
        },
        Marker {
            position: last,
            text: if in_text(last) { "}" } else { "]" },
        },
    ]
}

fn find_text(children: &[ViewNode], id: NodeId) -> Option<&ViewText> {
    children.iter().find_map(|child| match child {
        ViewNode::Text(text) if text.id() == id => Some(text),
        ViewNode::Element(element) => find_text(element.children(), id),
        ViewNode::Text(_) => None,
    })
}

fn write_markers(parent: NodeId, offset: usize, markers: &[Marker], out: &mut String) {
    for marker in markers {
        if marker.position.parent == parent && marker.position.offset == offset {
            out.push_str(marker.text);
        }
    }
}

fn write_children(parent: NodeId, children: &[ViewNode], markers: &[Marker], show_kind: bool, out: &mut String) {
    for (index, child) in children.iter().enumerate() {
        write_markers(parent, index, markers, out);

        match child {
            ViewNode::Text(text) => {
                for (offset, ch) in text.data().chars().enumerate() {
                    write_markers(text.id(), offset, markers, out);
                    out.push(ch);
                }
                write_markers(text.id(), text.char_len(), markers, out);
            }
            ViewNode::Element(element) => {
                let name = if show_kind {
                    format!("{}:{}", element.kind().prefix(), element.name())
                } else {
                    element.name().to_string()
                };

                out.push('<');
                out.push_str(&name);
                for (key, value) in element.rendered_attributes() {
                    out.push_str(&format!(" {}=\"{}\"", key, value));
                }

                out.push('>');
                write_children(element.id(), element.children(), markers, show_kind, out);
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
        }
    }
    write_markers(parent, children.len(), markers, out);
}
