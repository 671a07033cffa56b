//! Selection model: anchor and focus positions inside the view

use crate::view::node::path_in;
use crate::view::{NodeId, ViewNode};
use std::fmt;

/// A place in the view: a child index when `parent` is an element, a
/// character offset when it is a text node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub parent: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(parent: NodeId, offset: usize) -> Self {
        Self { parent, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.parent, self.offset)
    }
}

/// Immutable selection value. Replace it as a whole, never in parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    range: Option<(Position, Position)>,
}

impl Selection {
    /// No selection
    pub fn empty() -> Self {
        Self { range: None }
    }

    /// Caret at `position`
    pub fn collapsed(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn new(anchor: Position, focus: Position) -> Self {
        Self {
            range: Some((anchor, focus)),
        }
    }

    pub fn anchor(&self) -> Option<Position> {
        self.range.map(|(anchor, _)| anchor)
    }

    pub fn focus(&self) -> Option<Position> {
        self.range.map(|(_, focus)| focus)
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self.range, Some((anchor, focus)) if anchor == focus)
    }

    /// Both positions, anchor first
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        self.range
            .into_iter()
            .flat_map(|(anchor, focus)| [anchor, focus])
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            None => write!(f, "(empty)"),
            Some((anchor, focus)) if anchor == focus => write!(f, "[{}]", anchor),
            Some((anchor, focus)) => write!(f, "[{} → {}]", anchor, focus),
        }
    }
}

/// Document-order key of a position below `container`: the child-index
/// path to its parent followed by the offset. Keys compare
/// lexicographically in document order.
pub fn position_key(container: NodeId, children: &[ViewNode], position: Position) -> Option<Vec<usize>> {
    let mut key = if position.parent == container {
        Vec::new()
    } else {
        path_in(children, position.parent)?
    };
    key.push(position.offset);
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection() {
        let selection = Selection::empty();
        assert!(selection.is_empty());
        assert!(!selection.is_collapsed());
        assert_eq!(selection.anchor(), None);
        assert_eq!(selection.positions().count(), 0);
    }

    #[test]
    fn test_collapsed_selection() {
        let node = NodeId::next();
        let selection = Selection::collapsed(Position::new(node, 2));

        assert!(selection.is_collapsed());
        assert_eq!(selection.anchor(), selection.focus());
        assert_eq!(selection.positions().count(), 2);
    }

    #[test]
    fn test_position_key_orders_positions() {
        use crate::view::ViewElement;

        let root = ViewElement::container("div")
            .with_child(ViewElement::container("p").with_child(ViewNode::text("ab")))
            .with_child(ViewElement::container("p"));
        let text = root.children()[0].as_element().unwrap().children()[0].id();

        let before = position_key(root.id(), root.children(), Position::new(root.id(), 0)).unwrap();
        let inside = position_key(root.id(), root.children(), Position::new(text, 1)).unwrap();
        let after = position_key(root.id(), root.children(), Position::new(root.id(), 1)).unwrap();

        assert_eq!(inside, vec![0, 0, 1]);
        assert!(before < inside);
        assert!(inside < after);
        assert!(position_key(root.id(), root.children(), Position::new(NodeId::next(), 0)).is_none());
    }

    #[test]
    fn test_range_selection() {
        let node = NodeId::next();
        let selection = Selection::new(Position::new(node, 0), Position::new(node, 3));

        assert!(!selection.is_collapsed());
        assert_eq!(selection.focus(), Some(Position::new(node, 3)));
        assert_eq!(selection, Selection::new(Position::new(node, 0), Position::new(node, 3)));
    }
}
