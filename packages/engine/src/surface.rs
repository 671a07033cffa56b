//! Render targets.
//!
//! A [`RenderSurface`] is the external, DOM-like container a root is bound
//! to. The renderer only ever talks to it through patches and a DOM-level
//! selection, so any backend that can apply path-based patches works.

use crate::error::{ViewError, ViewResult};
use crate::renderer::{vnodes_to_html, Patch, VNode};
use std::cell::RefCell;
use std::rc::Rc;

/// Position inside a surface: a child-index path from the container to a
/// node, plus an offset into it (child index or character offset)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomPosition {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl DomPosition {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomSelection {
    pub anchor: DomPosition,
    pub focus: DomPosition,
}

impl DomSelection {
    pub fn collapsed(position: DomPosition) -> Self {
        Self {
            anchor: position.clone(),
            focus: position,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

pub trait RenderSurface {
    /// Tag name of the container element
    fn tag_name(&self) -> String {
        "div".to_string()
    }

    fn apply_patches(&mut self, patches: &[Patch]) -> ViewResult<()>;

    fn set_selection(&mut self, selection: Option<&DomSelection>);
}

#[derive(Debug, Default)]
struct MemoryDom {
    tag: String,
    children: Vec<VNode>,
    selection: Option<DomSelection>,
    applied: usize,
}

/// In-memory surface. Clones share the same underlying DOM, so a test can
/// keep a handle while the tree owns another.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    dom: Rc<RefCell<MemoryDom>>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new("div")
    }
}

impl MemorySurface {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            dom: Rc::new(RefCell::new(MemoryDom {
                tag: tag.into(),
                ..Default::default()
            })),
        }
    }

    /// Inner HTML of the container
    pub fn to_html(&self) -> String {
        vnodes_to_html(&self.dom.borrow().children)
    }

    pub fn children(&self) -> Vec<VNode> {
        self.dom.borrow().children.clone()
    }

    pub fn selection(&self) -> Option<DomSelection> {
        self.dom.borrow().selection.clone()
    }

    /// Number of patches applied since creation
    pub fn applied_patches(&self) -> usize {
        self.dom.borrow().applied
    }

    /// Overwrite a text node the way a user typing would
    pub fn set_text(&self, path: &[usize], content: impl Into<String>) -> bool {
        let mut dom = self.dom.borrow_mut();
        match node_at_path_mut(&mut dom.children, path) {
            Some(VNode::Text { content: current, .. }) => {
                *current = content.into();
                true
            }
            _ => false,
        }
    }

    /// Move the DOM selection the way a user clicking would
    pub fn select(&self, selection: Option<DomSelection>) {
        self.dom.borrow_mut().selection = selection;
    }
}

impl RenderSurface for MemorySurface {
    fn tag_name(&self) -> String {
        self.dom.borrow().tag.clone()
    }

    fn apply_patches(&mut self, patches: &[Patch]) -> ViewResult<()> {
        let mut dom = self.dom.borrow_mut();
        for patch in patches {
            apply_patch(&mut dom.children, patch).map_err(ViewError::InvalidPatch)?;
            dom.applied += 1;
        }
        Ok(())
    }

    fn set_selection(&mut self, selection: Option<&DomSelection>) {
        self.dom.borrow_mut().selection = selection.cloned();
    }
}

fn node_at_path_mut<'a>(nodes: &'a mut [VNode], path: &[usize]) -> Option<&'a mut VNode> {
    let (first, rest) = path.split_first()?;
    let node = nodes.get_mut(*first)?;
    if rest.is_empty() {
        return Some(node);
    }
    match node {
        VNode::Element { children, .. } => node_at_path_mut(children, rest),
        VNode::Text { .. } => None,
    }
}

fn children_at_path<'a>(nodes: &'a mut Vec<VNode>, path: &[usize]) -> Option<&'a mut Vec<VNode>> {
    if path.is_empty() {
        return Some(nodes);
    }
    match node_at_path_mut(nodes, path)? {
        VNode::Element { children, .. } => Some(children),
        VNode::Text { .. } => None,
    }
}

/// Apply one patch to a child list
pub fn apply_patch(children: &mut Vec<VNode>, patch: &Patch) -> Result<(), String> {
    let split = |path: &[usize]| -> Result<(Vec<usize>, usize), String> {
        path.split_last()
            .map(|(index, parent)| (parent.to_vec(), *index))
            .ok_or_else(|| "empty patch path".to_string())
    };
    let missing = |path: &[usize]| format!("no node at {:?}", path);

    match patch {
        Patch::ReplaceChildren { path, children: new } => {
            let list = children_at_path(children, path).ok_or_else(|| missing(path))?;
            *list = new.clone();
        }
        Patch::CreateNode { path, node } => {
            let (parent, index) = split(path)?;
            let list = children_at_path(children, &parent).ok_or_else(|| missing(&parent))?;
            if index > list.len() {
                return Err(missing(path));
            }
            list.insert(index, node.clone());
        }
        Patch::RemoveNode { path } => {
            let (parent, index) = split(path)?;
            let list = children_at_path(children, &parent).ok_or_else(|| missing(&parent))?;
            if index >= list.len() {
                return Err(missing(path));
            }
            list.remove(index);
        }
        Patch::ReplaceNode { path, node } => {
            let target = node_at_path_mut(children, path).ok_or_else(|| missing(path))?;
            *target = node.clone();
        }
        Patch::UpdateAttributes { path, attributes } => match node_at_path_mut(children, path) {
            Some(VNode::Element { attributes: current, .. }) => *current = attributes.clone(),
            _ => return Err(missing(path)),
        },
        Patch::UpdateText { path, content } => match node_at_path_mut(children, path) {
            Some(VNode::Text { content: current, .. }) => *current = content.clone(),
            _ => return Err(missing(path)),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> VNode {
        VNode::element("p").with_child(VNode::text(text))
    }

    #[test]
    fn test_apply_patches_to_memory_surface() {
        let mut surface = MemorySurface::default();
        let handle = surface.clone();

        surface
            .apply_patches(&[
                Patch::CreateNode { path: vec![0], node: paragraph("a") },
                Patch::CreateNode { path: vec![1], node: paragraph("b") },
                Patch::UpdateText { path: vec![1, 0], content: "c".to_string() },
            ])
            .unwrap();

        assert_eq!(handle.to_html(), "<p>a</p><p>c</p>");
        assert_eq!(handle.applied_patches(), 3);

        surface.apply_patches(&[Patch::RemoveNode { path: vec![0] }]).unwrap();
        assert_eq!(handle.to_html(), "<p>c</p>");
    }

    #[test]
    fn test_invalid_patch_path() {
        let mut surface = MemorySurface::default();
        let result = surface.apply_patches(&[Patch::RemoveNode { path: vec![4] }]);
        assert!(matches!(result, Err(ViewError::InvalidPatch(_))));
    }

    #[test]
    fn test_replace_children() {
        let mut surface = MemorySurface::default();
        surface
            .apply_patches(&[Patch::ReplaceChildren {
                path: vec![],
                children: vec![paragraph("x")],
            }])
            .unwrap();
        assert_eq!(surface.to_html(), "<p>x</p>");
    }

    #[test]
    fn test_set_text_and_selection() {
        let mut surface = MemorySurface::default();
        surface
            .apply_patches(&[Patch::CreateNode { path: vec![0], node: paragraph("a") }])
            .unwrap();

        assert!(surface.set_text(&[0, 0], "ab"));
        assert!(!surface.set_text(&[0], "nope"));
        assert_eq!(surface.to_html(), "<p>ab</p>");

        let selection = DomSelection::collapsed(DomPosition::new(vec![0, 0], 2));
        surface.set_selection(Some(&selection));
        assert_eq!(surface.selection(), Some(selection));
    }
}
