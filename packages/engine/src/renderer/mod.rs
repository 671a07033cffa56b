//! # Renderer
//!
//! Reconciles view roots onto their surfaces.
//!
//! ```text
//! ViewState ──► snapshot (VNode) ──► diff against last snapshot ──► patches ──► surface
//!     │                                                                         ▲
//!     └── selection ──► DOM selection (after the inline filler) ────────────────┘
//! ```
//!
//! The last snapshot of every root is kept. It carries the view ids of the
//! rendered nodes, so DOM paths reported by observers can be mapped back
//! to view positions.

mod differ;
mod vdom;

pub use differ::{diff_children, Patch};
pub use vdom::{node_at_path, vnodes_to_html, VNode};

use crate::error::{ViewError, ViewResult};
use crate::selection::{Position, Selection};
use crate::surface::{DomPosition, DomSelection, RenderSurface};
use crate::tree::ViewState;
use crate::view::{ElementKind, NodeId, NodeRef, ViewElement, ViewNode};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

/// Characters rendered so a caret can sit between two non-text nodes
pub const INLINE_FILLER: &str = "\u{2060}\u{2060}\u{2060}\u{2060}\u{2060}\u{2060}\u{2060}";

/// Length of [`INLINE_FILLER`] in characters
pub const INLINE_FILLER_LENGTH: usize = 7;

/// Remove inline filler characters from surface text
pub fn strip_inline_filler(text: &str) -> String {
    text.replace('\u{2060}', "")
}

/// What a render pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub patches: usize,
    pub selection_updates: usize,
}

impl RenderStats {
    pub fn is_noop(&self) -> bool {
        self.patches == 0 && self.selection_updates == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FillerPosition {
    parent: NodeId,
    parent_path: Vec<usize>,
    index: usize,
}

/// A node of the last snapshot addressed by a DOM path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomTarget {
    /// The inline filler; text typed into it belongs at `position`
    Filler { position: Position },
    Text { id: NodeId, content: String },
    Element { id: NodeId },
}

struct RootRenderer {
    surface: Box<dyn RenderSurface>,
    snapshot: Vec<VNode>,
    filler: Option<FillerPosition>,
    selection: Option<DomSelection>,
    stale: bool,
    rendered: bool,
}

#[derive(Default)]
pub struct Renderer {
    roots: BTreeMap<String, RootRenderer>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("roots", &self.roots.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, name: impl Into<String>, surface: Box<dyn RenderSurface>) {
        self.roots.insert(
            name.into(),
            RootRenderer {
                surface,
                snapshot: Vec::new(),
                filler: None,
                selection: None,
                stale: false,
                rendered: false,
            },
        );
    }

    pub fn clear(&mut self) {
        self.roots.clear();
    }

    /// Force a full resync of `root` on the next render, because its
    /// surface changed behind the renderer's back
    pub fn invalidate(&mut self, root: &str) {
        if let Some(state) = self.roots.get_mut(root) {
            trace!(root, "Invalidating rendered snapshot");
            state.stale = true;
        }
    }

    /// Last snapshot rendered for `root`
    pub fn snapshot(&self, root: &str) -> Option<&[VNode]> {
        self.roots.get(root).map(|state| state.snapshot.as_slice())
    }

    pub fn render(&mut self, state: &ViewState) -> ViewResult<RenderStats> {
        let mut stats = RenderStats::default();
        let selection = state.selection();

        for (name, render_state) in self.roots.iter_mut() {
            let root = state
                .root(name)
                .ok_or_else(|| ViewError::RootNotFound(name.clone()))?;

            let filler = filler_position(root, selection);
            let snapshot = snapshot_children(root, filler.as_ref());

            let patches = if render_state.stale || !render_state.rendered {
                vec![Patch::ReplaceChildren {
                    path: Vec::new(),
                    children: snapshot.clone(),
                }]
            } else {
                diff_children(&render_state.snapshot, &snapshot, &[])
            };

            if !patches.is_empty() {
                debug!(root = %name, patches = patches.len(), "Applying patches");
                render_state.surface.apply_patches(&patches)?;
                stats.patches += patches.len();
            }

            render_state.snapshot = snapshot;
            render_state.filler = filler;
            render_state.stale = false;
            render_state.rendered = true;

            let dom_selection = dom_selection_for(root, selection, render_state.filler.as_ref());
            if dom_selection != render_state.selection {
                trace!(root = %name, ?dom_selection, "Updating surface selection");
                render_state.surface.set_selection(dom_selection.as_ref());
                render_state.selection = dom_selection;
                stats.selection_updates += 1;
            }
        }

        Ok(stats)
    }

    /// Resolve a DOM path against the last snapshot of `root`
    pub fn resolve_dom_path(&self, root: &str, root_id: NodeId, path: &[usize]) -> Option<DomTarget> {
        let state = self.roots.get(root)?;

        if path.is_empty() {
            return Some(DomTarget::Element { id: root_id });
        }

        match node_at_path(&state.snapshot, path)? {
            VNode::Text { id: None, .. } => {
                let filler = state.filler.as_ref()?;
                Some(DomTarget::Filler {
                    position: Position::new(filler.parent, filler.index),
                })
            }
            VNode::Text { id: Some(id), content } => Some(DomTarget::Text {
                id: *id,
                content: content.clone(),
            }),
            VNode::Element { id: Some(id), .. } => Some(DomTarget::Element { id: *id }),
            VNode::Element { id: None, .. } => None,
        }
    }

    /// Map a surface position of `root` to a view position
    pub fn dom_to_view(&self, root: &str, root_id: NodeId, position: &DomPosition) -> Option<Position> {
        let state = self.roots.get(root)?;

        match self.resolve_dom_path(root, root_id, &position.path)? {
            DomTarget::Filler { position } => Some(position),
            DomTarget::Text { id, content } => {
                let offset = position.offset.min(content.chars().count());
                Some(Position::new(id, offset))
            }
            DomTarget::Element { id } => {
                let offset = match &state.filler {
                    Some(filler) if filler.parent == id && position.offset > filler.index => {
                        position.offset - 1
                    }
                    _ => position.offset,
                };
                Some(Position::new(id, offset))
            }
        }
    }
}

/// Where the inline filler goes: a collapsed selection inside an element
/// whose neighbours at the caret are not text
fn filler_position(root: &ViewElement, selection: &Selection) -> Option<FillerPosition> {
    if !selection.is_collapsed() {
        return None;
    }
    let position = selection.anchor()?;

    let NodeRef::Element(parent) = root.find(position.parent)? else {
        return None;
    };
    if parent.kind() == ElementKind::Empty {
        return None;
    }

    let children = parent.children();
    let before_is_text = position
        .offset
        .checked_sub(1)
        .and_then(|i| children.get(i))
        .map_or(false, ViewNode::is_text);
    let after_is_text = children.get(position.offset).map_or(false, ViewNode::is_text);

    if before_is_text || after_is_text {
        return None;
    }

    Some(FillerPosition {
        parent: parent.id(),
        parent_path: root.path_to(parent.id())?,
        index: position.offset,
    })
}

fn snapshot_children(root: &ViewElement, filler: Option<&FillerPosition>) -> Vec<VNode> {
    let mut children: Vec<VNode> = root.children().iter().map(VNode::from_view).collect();

    if let Some(filler) = filler {
        if let Some(list) = snapshot_children_at(&mut children, &filler.parent_path) {
            let index = filler.index.min(list.len());
            list.insert(index, VNode::text(INLINE_FILLER));
        }
    }

    children
}

fn snapshot_children_at<'a>(nodes: &'a mut Vec<VNode>, path: &[usize]) -> Option<&'a mut Vec<VNode>> {
    let Some((first, rest)) = path.split_first() else {
        return Some(nodes);
    };
    match nodes.get_mut(*first)? {
        VNode::Element { children, .. } => snapshot_children_at(children, rest),
        VNode::Text { .. } => None,
    }
}

fn dom_selection_for(
    root: &ViewElement,
    selection: &Selection,
    filler: Option<&FillerPosition>,
) -> Option<DomSelection> {
    let anchor = view_to_dom(root, selection.anchor()?, filler)?;
    let focus = view_to_dom(root, selection.focus()?, filler)?;
    Some(DomSelection { anchor, focus })
}

fn view_to_dom(root: &ViewElement, position: Position, filler: Option<&FillerPosition>) -> Option<DomPosition> {
    if let Some(filler) = filler {
        if filler.parent == position.parent && filler.index == position.offset {
            let mut path = filler.parent_path.clone();
            path.push(filler.index);
            return Some(DomPosition::new(path, INLINE_FILLER_LENGTH));
        }
    }

    let view_path = root.path_to(position.parent)?;
    let path = shift_for_filler(&view_path, filler);

    let offset = match root.node_at_path(&view_path)? {
        NodeRef::Element(element) => match filler {
            Some(filler) if filler.parent == element.id() && position.offset > filler.index => {
                position.offset + 1
            }
            _ => position.offset,
        },
        NodeRef::Text(_) => position.offset,
    };

    Some(DomPosition::new(path, offset))
}

/// Adjust a view path for the filler node inserted before it
fn shift_for_filler(path: &[usize], filler: Option<&FillerPosition>) -> Vec<usize> {
    let mut shifted = path.to_vec();
    if let Some(filler) = filler {
        let depth = filler.parent_path.len();
        if path.len() > depth && path[..depth] == filler.parent_path[..] && path[depth] >= filler.index {
            shifted[depth] += 1;
        }
    }
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev_utils::parse_view;
    use crate::surface::MemorySurface;

    fn state_with(notation: &str) -> (ViewState, Renderer, MemorySurface) {
        let parsed = parse_view(notation).unwrap();
        let mut state = ViewState::default();
        let root = state.insert_root("main", "div");
        root.append_children(parsed.fragment.into_children());
        state.set_selection(parsed.selection).unwrap();

        let surface = MemorySurface::default();
        let mut renderer = Renderer::new();
        renderer.add_root("main", Box::new(surface.clone()));
        (state, renderer, surface)
    }

    #[test]
    fn test_first_render_writes_content() {
        let (state, mut renderer, surface) = state_with("<p>foo</p><p>bar</p>");
        let stats = renderer.render(&state).unwrap();

        assert_eq!(stats.patches, 1);
        assert_eq!(surface.to_html(), "<p>foo</p><p>bar</p>");
    }

    #[test]
    fn test_second_render_is_a_noop() {
        let (state, mut renderer, _) = state_with("<p>fo{}o</p>");
        renderer.render(&state).unwrap();
        let stats = renderer.render(&state).unwrap();
        assert!(stats.is_noop());
    }

    #[test]
    fn test_inline_filler_between_attribute_elements() {
        let (state, mut renderer, surface) = state_with(
            "<container:p><attribute:strong>foo</attribute:strong>[]<attribute:strong>bar</attribute:strong></container:p>",
        );
        renderer.render(&state).unwrap();

        assert_eq!(
            surface.to_html(),
            format!("<p><strong>foo</strong>{}<strong>bar</strong></p>", INLINE_FILLER)
        );
        assert_eq!(
            surface.selection(),
            Some(DomSelection::collapsed(DomPosition::new(vec![0, 1], INLINE_FILLER_LENGTH)))
        );
    }

    #[test]
    fn test_no_filler_next_to_text() {
        let (state, mut renderer, surface) = state_with("<p>foo[]<strong>bar</strong></p>");
        renderer.render(&state).unwrap();
        assert_eq!(surface.to_html(), "<p>foo<strong>bar</strong></p>");
        assert_eq!(
            surface.selection(),
            Some(DomSelection::collapsed(DomPosition::new(vec![0], 1)))
        );
    }

    #[test]
    fn test_filler_removed_when_selection_moves() {
        let (mut state, mut renderer, surface) =
            state_with("<p><strong>foo</strong>[]<strong>bar</strong></p>");
        renderer.render(&state).unwrap();

        let text = state.root("main").unwrap().children()[0]
            .as_element()
            .unwrap()
            .children()[0]
            .as_element()
            .unwrap()
            .children()[0]
            .id();
        state.set_selection(Selection::collapsed(Position::new(text, 1))).unwrap();

        // Filler text replaced by the second strong, old second strong removed
        let stats = renderer.render(&state).unwrap();
        assert_eq!(stats.patches, 2);
        assert_eq!(surface.to_html(), "<p><strong>foo</strong><strong>bar</strong></p>");
        assert_eq!(
            surface.selection(),
            Some(DomSelection::collapsed(DomPosition::new(vec![0, 0, 0], 1)))
        );
    }

    #[test]
    fn test_dom_to_view_round_trip_through_filler() {
        let (state, mut renderer, _) =
            state_with("<p><strong>foo</strong>[]<strong>bar</strong></p>");
        renderer.render(&state).unwrap();
        let root_id = state.root("main").unwrap().id();
        let p_id = state.root("main").unwrap().children()[0].id();

        // Caret inside the filler maps to the caret position in the view
        let position = renderer
            .dom_to_view("main", root_id, &DomPosition::new(vec![0, 1], 3))
            .unwrap();
        assert_eq!(position, Position::new(p_id, 1));

        // Element offsets after the filler skip it
        let position = renderer
            .dom_to_view("main", root_id, &DomPosition::new(vec![0], 3))
            .unwrap();
        assert_eq!(position, Position::new(p_id, 2));

        assert!(matches!(
            renderer.resolve_dom_path("main", root_id, &[0, 1]),
            Some(DomTarget::Filler { .. })
        ));
        assert!(matches!(
            renderer.resolve_dom_path("main", root_id, &[0, 2, 0]),
            Some(DomTarget::Text { ref content, .. }) if content == "bar"
        ));
    }

    #[test]
    fn test_invalidate_forces_full_resync() {
        let (state, mut renderer, surface) = state_with("<p>foo</p>");
        renderer.render(&state).unwrap();

        surface.set_text(&[0, 0], "changed by user");
        renderer.invalidate("main");
        renderer.render(&state).unwrap();

        assert_eq!(surface.to_html(), "<p>foo</p>");
    }

    #[test]
    fn test_strip_inline_filler() {
        assert_eq!(strip_inline_filler(&format!("{}x", INLINE_FILLER)), "x");
    }
}
