use super::{observer_base_impl, Observer, ObserverBase, ObserverContext, ObserverKind};
use crate::events::{DomEvent, ViewEvent};
use crate::selection::Selection;
use tracing::trace;

/// Maps surface selection changes to view selections.
///
/// A change that maps to the current view selection is not reported, so
/// the echo of the renderer's own selection update stays silent.
#[derive(Debug)]
pub struct SelectionObserver {
    base: ObserverBase,
}

impl SelectionObserver {
    pub fn new() -> Self {
        Self {
            base: ObserverBase::new(),
        }
    }
}

impl Default for SelectionObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for SelectionObserver {
    observer_base_impl!(ObserverKind::Selection);

    fn handle(&mut self, event: &DomEvent, ctx: &ObserverContext<'_>) -> Vec<ViewEvent> {
        let DomEvent::SelectionChange { root, selection } = event else {
            return Vec::new();
        };
        if !self.base.accepts(root) {
            return Vec::new();
        }
        let Some(root_id) = ctx.state.root(root).map(|element| element.id()) else {
            return Vec::new();
        };

        let new_selection = selection
            .as_ref()
            .and_then(|dom| {
                let anchor = ctx.renderer.dom_to_view(root, root_id, &dom.anchor)?;
                let focus = ctx.renderer.dom_to_view(root, root_id, &dom.focus)?;
                Some(Selection::new(anchor, focus))
            })
            .unwrap_or_default();

        let old_selection = *ctx.state.selection();
        if new_selection == old_selection {
            trace!(root = %root, "Selection unchanged");
            return Vec::new();
        }

        vec![ViewEvent::SelectionChange {
            root: root.clone(),
            old_selection,
            new_selection,
        }]
    }
}
