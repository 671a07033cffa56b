//! # View Tree
//!
//! Owns the view roots, the selection, the attached observers and the
//! renderer.
//!
//! ```text
//! DomEvent ──► observer of its category ──► ViewEvent ──► listeners (by priority)
//!                                                            │
//!                                                            ▼
//!                                     ViewState (roots, selection, dirty)
//!                                                            │
//!                                         render() / change() ▼
//!                                                     surfaces (patches)
//! ```
//!
//! Rendering is explicit through [`ViewTree::render`], and reactive:
//! [`ViewTree::change`] and [`ViewTree::dispatch`] render once at the end
//! when the state became dirty. Nested `change` blocks render only when
//! the outermost block completes.

use crate::error::{ViewError, ViewResult};
use crate::events::{DomEvent, ViewEvent};
use crate::observer::{Observer, ObserverContext, ObserverKind};
use crate::renderer::{RenderStats, Renderer};
use crate::selection::{position_key, Position, Selection};
use crate::surface::RenderSurface;
use crate::view::{ElementKind, NodeId, NodeRef, ViewElement, ViewFragment, ViewNode, ViewText};
use quire_common::{Emitter, EventInfo, ListenerId, Priority};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

/// The mutable part of a tree: roots, selection and the render-dirty flag.
///
/// Listeners receive it as the context of every view event.
#[derive(Debug, Default)]
pub struct ViewState {
    roots: BTreeMap<String, ViewElement>,
    selection: Selection,
    dirty: bool,
    focused_root: Option<String>,
}

impl ViewState {
    pub fn root(&self, name: &str) -> Option<&ViewElement> {
        self.roots.get(name)
    }

    /// Mutable access to a root; the state is considered changed
    pub fn root_mut(&mut self, name: &str) -> Option<&mut ViewElement> {
        let root = self.roots.get_mut(name)?;
        self.dirty = true;
        Some(root)
    }

    pub fn root_names(&self) -> Vec<&str> {
        self.roots.keys().map(String::as_str).collect()
    }

    pub fn has_root(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    /// Add an empty root element, or return the existing one
    pub(crate) fn insert_root(&mut self, name: &str, tag: &str) -> &mut ViewElement {
        self.dirty = true;
        self.roots
            .entry(name.to_string())
            .or_insert_with(|| ViewElement::new(ElementKind::Root, tag))
    }

    pub(crate) fn clear(&mut self) {
        self.roots.clear();
        self.selection = Selection::empty();
        self.focused_root = None;
        self.dirty = false;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection as a whole.
    ///
    /// Both positions must point into live nodes of the same root, with
    /// offsets inside their parent.
    pub fn set_selection(&mut self, selection: Selection) -> ViewResult<()> {
        let mut owner: Option<&str> = None;

        for position in selection.positions() {
            let root = self.root_of(position.parent).ok_or_else(|| {
                ViewError::InvalidSelection(format!("{} is not inside any root", position))
            })?;

            match owner {
                Some(owner) if owner != root => {
                    return Err(ViewError::InvalidSelection(
                        "anchor and focus are in different roots".to_string(),
                    ));
                }
                _ => owner = Some(root),
            }

            let node = self
                .find(position.parent)
                .ok_or(ViewError::NodeNotFound(position.parent))?;
            if let NodeRef::Element(element) = node {
                if element.kind() == ElementKind::Empty {
                    return Err(ViewError::InvalidSelection(format!(
                        "{} is inside the empty element <{}>",
                        position,
                        element.name()
                    )));
                }
            }
            if position.offset > node.max_offset() {
                return Err(ViewError::InvalidSelection(format!(
                    "offset of {} exceeds {}",
                    position,
                    node.max_offset()
                )));
            }
        }

        if self.selection != selection {
            trace!(%selection, "Selection replaced");
            self.selection = selection;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.dirty = false;
    }

    /// Root that last received focus
    pub fn focused_root(&self) -> Option<&str> {
        self.focused_root.as_deref()
    }

    /// Find a node in any root
    pub fn find(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.roots.values().find_map(|root| root.find(id))
    }

    /// Name of the root containing the node
    pub fn root_of(&self, id: NodeId) -> Option<&str> {
        self.roots
            .iter()
            .find(|(_, root)| root.find(id).is_some())
            .map(|(name, _)| name.as_str())
    }

    /// Copy of the selected content, with fresh ids.
    ///
    /// Nodes fully inside the selection are copied whole; elements cut by
    /// a selection boundary are copied without their unselected children
    /// and text nodes are sliced.
    pub fn selected_content(&self) -> ViewFragment {
        match self.selected_range() {
            Some(range) if range.start_key != range.end_key => {
                let Some(root) = self.roots.get(range.root) else {
                    return ViewFragment::new();
                };
                ViewFragment::from_children(copy_range(
                    root.children(),
                    &[],
                    &range.start_key,
                    &range.end_key,
                ))
            }
            _ => ViewFragment::new(),
        }
    }

    /// Remove the selected content and collapse the selection at its start
    pub fn delete_selected_content(&mut self) -> ViewResult<()> {
        let Some(range) = self.selected_range() else {
            return Ok(());
        };
        if range.start_key == range.end_key {
            return Ok(());
        }

        let root_name = range.root.to_string();
        let start = range.start;
        let (start_key, end_key) = (range.start_key, range.end_key);

        let root = self
            .roots
            .get_mut(&root_name)
            .ok_or_else(|| ViewError::RootNotFound(root_name.clone()))?;
        delete_range(root.children_mut(), &[], &start_key, &end_key);

        debug!(root = %root_name, "Deleted selected content");
        self.selection = Selection::collapsed(start);
        self.dirty = true;
        Ok(())
    }

    /// Insert `fragment` at the selection, replacing selected content.
    ///
    /// A caret inside text splits the text node. The selection ends up
    /// collapsed right after the inserted nodes.
    pub fn insert_fragment_at_selection(&mut self, fragment: ViewFragment) -> ViewResult<()> {
        if self.selection.is_empty() {
            return Err(ViewError::InvalidSelection("nothing is selected".to_string()));
        }
        if !self.selection.is_collapsed() {
            self.delete_selected_content()?;
        }

        let nodes = fragment.into_children();
        if nodes.is_empty() {
            return Ok(());
        }

        let position = self
            .selection
            .anchor()
            .ok_or_else(|| ViewError::InvalidSelection("nothing is selected".to_string()))?;
        let root_name = self
            .root_of(position.parent)
            .map(str::to_string)
            .ok_or(ViewError::NodeNotFound(position.parent))?;
        let root = self
            .roots
            .get_mut(&root_name)
            .ok_or_else(|| ViewError::RootNotFound(root_name.clone()))?;
        let path = root
            .path_to(position.parent)
            .ok_or(ViewError::NodeNotFound(position.parent))?;

        let in_text = match root.node_at_path(&path) {
            Some(NodeRef::Text(_)) => true,
            Some(NodeRef::Element(element)) if element.kind() == ElementKind::Empty => {
                return Err(ViewError::NotAContainer(element.id()));
            }
            Some(NodeRef::Element(_)) => false,
            None => return Err(ViewError::NodeNotFound(position.parent)),
        };

        let count = nodes.len();
        let caret = if in_text {
            let (parent_path, last) = path.split_at(path.len() - 1);
            let parent = root
                .element_at_path_mut(parent_path)
                .ok_or(ViewError::NodeNotFound(position.parent))?;
            let index = split_text(parent, last[0], position.offset)?;
            insert_nodes(parent, index, nodes)
        } else {
            let parent = root
                .element_at_path_mut(&path)
                .ok_or(ViewError::NodeNotFound(position.parent))?;
            insert_nodes(parent, position.offset, nodes)
        };

        debug!(root = %root_name, nodes = count, "Inserted fragment at selection");
        self.selection = Selection::collapsed(caret);
        self.dirty = true;
        Ok(())
    }

    /// Selection start and end as document-order keys, start first
    fn selected_range(&self) -> Option<SelectedRange<'_>> {
        let anchor = self.selection.anchor()?;
        let focus = self.selection.focus()?;
        let (name, root) = self
            .roots
            .iter()
            .find(|(_, root)| root.find(anchor.parent).is_some())?;

        let anchor_key = position_key(root.id(), root.children(), anchor)?;
        let focus_key = position_key(root.id(), root.children(), focus)?;

        Some(if anchor_key <= focus_key {
            SelectedRange {
                root: name,
                start: anchor,
                start_key: anchor_key,
                end_key: focus_key,
            }
        } else {
            SelectedRange {
                root: name,
                start: focus,
                start_key: focus_key,
                end_key: anchor_key,
            }
        })
    }
}

struct SelectedRange<'a> {
    root: &'a str,
    start: Position,
    start_key: Vec<usize>,
    end_key: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    Outside,
    Inside,
    Partial,
}

/// How the child at `index` below `path` relates to `[start, end]`
fn overlap(path: &[usize], index: usize, start: &[usize], end: &[usize]) -> Overlap {
    let mut before = path.to_vec();
    before.push(index);
    let mut after = path.to_vec();
    after.push(index + 1);

    if after.as_slice() <= start || end <= before.as_slice() {
        Overlap::Outside
    } else if start <= before.as_slice() && after.as_slice() <= end {
        Overlap::Inside
    } else {
        Overlap::Partial
    }
}

/// Selected character range of the text node whose key is `node_key`
fn text_bounds(node_key: &[usize], start: &[usize], end: &[usize], len: usize) -> (usize, usize) {
    let inner = |key: &[usize]| {
        (key.len() == node_key.len() + 1 && key.starts_with(node_key)).then(|| key[node_key.len()])
    };
    (inner(start).unwrap_or(0), inner(end).unwrap_or(len))
}

fn copy_range(children: &[ViewNode], path: &[usize], start: &[usize], end: &[usize]) -> Vec<ViewNode> {
    let mut out = Vec::new();

    for (index, child) in children.iter().enumerate() {
        let mut child_path = path.to_vec();
        child_path.push(index);

        match (overlap(path, index, start, end), child) {
            (Overlap::Outside, _) => {}
            (Overlap::Inside, _) => out.push(child.deep_clone()),
            (Overlap::Partial, ViewNode::Text(text)) => {
                let (from, to) = text_bounds(&child_path, start, end, text.char_len());
                let data = text.slice(from, to);
                if !data.is_empty() {
                    out.push(ViewNode::text(data));
                }
            }
            (Overlap::Partial, ViewNode::Element(element)) => {
                let mut copy = element.shallow_clone();
                copy.append_children(copy_range(element.children(), &child_path, start, end));
                out.push(copy.into());
            }
        }
    }

    out
}

fn delete_range(children: &mut Vec<ViewNode>, path: &[usize], start: &[usize], end: &[usize]) {
    // Back to front so earlier indexes stay valid
    for index in (0..children.len()).rev() {
        let mut child_path = path.to_vec();
        child_path.push(index);

        match overlap(path, index, start, end) {
            Overlap::Outside => {}
            Overlap::Inside => {
                children.remove(index);
            }
            Overlap::Partial => match &mut children[index] {
                ViewNode::Text(text) => {
                    let (from, to) = text_bounds(&child_path, start, end, text.char_len());
                    let kept = format!("{}{}", text.slice(0, from), text.slice(to, text.char_len()));
                    text.set_data(kept);
                }
                ViewNode::Element(element) => {
                    delete_range(element.children_mut(), &child_path, start, end);
                }
            },
        }
    }
}

/// Split the text child at `index` at character `offset`. Returns the
/// child index where content goes between the two halves.
fn split_text(parent: &mut ViewElement, index: usize, offset: usize) -> ViewResult<usize> {
    let parent_id = parent.id();
    let Some(ViewNode::Text(text)) = parent.children_mut().get_mut(index) else {
        return Err(ViewError::NodeNotFound(parent_id));
    };

    let before = text.slice(0, offset);
    let after = text.slice(offset, text.char_len());

    let insert_at = if before.is_empty() {
        parent.remove_child(index);
        index
    } else {
        text.set_data(before);
        index + 1
    };

    if !after.is_empty() {
        parent.insert_child(insert_at, ViewText::new(after));
    }
    Ok(insert_at)
}

fn insert_nodes(parent: &mut ViewElement, index: usize, nodes: Vec<ViewNode>) -> Position {
    let mut index = index.min(parent.child_count());
    for node in nodes {
        parent.insert_child(index, node);
        index += 1;
    }
    Position::new(parent.id(), index)
}

pub struct ViewTree {
    state: ViewState,
    observers: BTreeMap<ObserverKind, Box<dyn Observer>>,
    renderer: Renderer,
    emitter: Emitter<ViewEvent, ViewState>,
    change_depth: usize,
    destroyed: bool,
}

impl fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewTree")
            .field("roots", &self.state.root_names())
            .field("observers", &self.observers.keys().collect::<Vec<_>>())
            .field("selection", &self.state.selection)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    /// A tree with no roots and no observers
    pub fn new() -> Self {
        Self {
            state: ViewState::default(),
            observers: BTreeMap::new(),
            renderer: Renderer::new(),
            emitter: Emitter::new(),
            change_depth: 0,
            destroyed: false,
        }
    }

    /// A tree with every built-in observer attached
    pub fn with_default_observers() -> Self {
        let mut tree = Self::new();
        for kind in ObserverKind::ALL {
            tree.add_observer(kind);
        }
        tree
    }

    fn ensure_alive(&self) -> ViewResult<()> {
        if self.destroyed {
            return Err(ViewError::Destroyed);
        }
        Ok(())
    }

    // Roots ----------------------------------------------------------------

    /// Register a root named `name` rendered onto `surface`
    pub fn create_root(
        &mut self,
        surface: impl RenderSurface + 'static,
        name: &str,
    ) -> ViewResult<NodeId> {
        self.ensure_alive()?;
        if self.state.has_root(name) {
            return Err(ViewError::DuplicateRoot(name.to_string()));
        }

        let tag = surface.tag_name();
        let id = self.state.insert_root(name, &tag).id();
        self.renderer.add_root(name, Box::new(surface));
        for observer in self.observers.values_mut() {
            observer.observe(name);
        }

        debug!(root = %name, tag = %tag, %id, "Created root");
        Ok(id)
    }

    pub fn root(&self, name: &str) -> Option<&ViewElement> {
        self.state.root(name)
    }

    pub fn root_mut(&mut self, name: &str) -> Option<&mut ViewElement> {
        self.state.root_mut(name)
    }

    pub fn root_names(&self) -> Vec<&str> {
        self.state.root_names()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    // Observers ------------------------------------------------------------

    /// Attach the built-in observer of `kind`. Attaching a kind twice keeps
    /// the existing observer and returns `false`.
    pub fn add_observer(&mut self, kind: ObserverKind) -> bool {
        if self.destroyed || self.observers.contains_key(&kind) {
            trace!(%kind, "Observer already attached");
            return false;
        }

        let mut observer = kind.create();
        for root in self.state.roots.keys() {
            observer.observe(root);
        }
        self.observers.insert(kind, observer);

        debug!(%kind, "Attached observer");
        true
    }

    /// Detach and destroy the observer of `kind`
    pub fn remove_observer(&mut self, kind: ObserverKind) -> bool {
        match self.observers.remove(&kind) {
            Some(mut observer) => {
                observer.destroy();
                debug!(%kind, "Removed observer");
                true
            }
            None => false,
        }
    }

    pub fn has_observer(&self, kind: ObserverKind) -> bool {
        self.observers.contains_key(&kind)
    }

    pub fn observer_mut(&mut self, kind: ObserverKind) -> Option<&mut (dyn Observer + 'static)> {
        match self.observers.get_mut(&kind) {
            Some(observer) => Some(observer.as_mut()),
            None => None,
        }
    }

    // Selection ------------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        self.state.selection()
    }

    /// Replace the selection. Does not render by itself.
    pub fn set_selection(&mut self, selection: Selection) -> ViewResult<()> {
        self.ensure_alive()?;
        self.state.set_selection(selection)
    }

    // Events ---------------------------------------------------------------

    /// Listen to a view event (`"selectionChange"`, `"clipboardInput"`, ...)
    pub fn on<F>(&mut self, event: impl Into<String>, priority: Priority, handler: F) -> ListenerId
    where
        F: FnMut(&mut EventInfo, &mut ViewState, &mut ViewEvent) + 'static,
    {
        self.emitter.listen(event, priority, handler)
    }

    pub fn off(&mut self, listener: ListenerId) -> bool {
        self.emitter.stop_listening(listener)
    }

    /// Fire a notification to listeners, then render if they changed the
    /// state. Returns the event as the listeners left it.
    pub fn fire(&mut self, event: ViewEvent) -> ViewResult<ViewEvent> {
        self.ensure_alive()?;
        let (event, _) = self.fire_event(event);
        self.render_if_needed()?;
        Ok(event)
    }

    /// Route an external event to the observer of its category and fire
    /// the notifications it produces
    pub fn dispatch(&mut self, event: DomEvent) -> ViewResult<Vec<ViewEvent>> {
        self.ensure_alive()?;

        let kind = event.category();
        let produced = match self.observers.get_mut(&kind) {
            Some(observer) => {
                let ctx = ObserverContext {
                    state: &self.state,
                    renderer: &self.renderer,
                };
                observer.handle(&event, &ctx)
            }
            None => {
                trace!(%kind, root = %event.root(), "No observer for event");
                Vec::new()
            }
        };

        let mut fired = Vec::with_capacity(produced.len());
        for notification in produced {
            let (notification, info) = self.fire_event(notification);
            if !info.is_stopped() {
                self.default_action(&notification);
            }
            fired.push(notification);
        }

        self.render_if_needed()?;
        Ok(fired)
    }

    fn fire_event(&mut self, mut event: ViewEvent) -> (ViewEvent, EventInfo) {
        let name = event.name().to_string();
        trace!(event = %name, "Firing view event");
        let info = self.emitter.fire_with(&name, &mut self.state, &mut event);
        (event, info)
    }

    /// What the tree does with a notification nobody stopped
    fn default_action(&mut self, event: &ViewEvent) {
        match event {
            ViewEvent::Mutations { root, .. } => {
                // The surface no longer matches the last snapshot
                self.renderer.invalidate(root);
                self.state.mark_dirty();
            }
            ViewEvent::SelectionChange { new_selection, .. } => {
                if let Err(err) = self.state.set_selection(*new_selection) {
                    debug!(%err, "Ignoring selection reported by the surface");
                }
            }
            ViewEvent::Focus { root } => {
                self.state.focused_root = Some(root.clone());
            }
            ViewEvent::Blur { root } => {
                if self.state.focused_root.as_deref() == Some(root.as_str()) {
                    self.state.focused_root = None;
                }
            }
            _ => {}
        }
    }

    // Rendering ------------------------------------------------------------

    /// Reconcile every root and the selection onto the surfaces
    pub fn render(&mut self) -> ViewResult<RenderStats> {
        self.ensure_alive()?;
        let stats = self.renderer.render(&self.state)?;
        self.state.mark_rendered();
        debug!(
            patches = stats.patches,
            selection_updates = stats.selection_updates,
            "Rendered"
        );
        Ok(stats)
    }

    fn render_if_needed(&mut self) -> ViewResult<()> {
        if self.change_depth == 0 && self.state.is_dirty() {
            self.render()?;
        }
        Ok(())
    }

    /// Run `block` and render once when the outermost block completes
    pub fn change<R>(&mut self, block: impl FnOnce(&mut ViewTree) -> R) -> ViewResult<R> {
        self.ensure_alive()?;

        self.change_depth += 1;
        let result = block(self);
        self.change_depth -= 1;

        self.render_if_needed()?;
        Ok(result)
    }

    /// Detach every observer and root. Further use fails with
    /// [`ViewError::Destroyed`].
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }

        for (_, mut observer) in std::mem::take(&mut self.observers) {
            observer.destroy();
        }
        self.renderer.clear();
        self.state.clear();
        self.emitter = Emitter::new();
        self.destroyed = true;
        debug!("View tree destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
