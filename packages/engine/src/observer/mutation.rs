use super::{observer_base_impl, Observer, ObserverBase, ObserverContext, ObserverKind};
use crate::events::{DomEvent, DomMutation, ViewEvent, ViewMutation};
use crate::renderer::{strip_inline_filler, DomTarget};
use tracing::debug;

/// Maps surface mutations back onto the view nodes they touched.
///
/// Text typed into the inline filler is reported as
/// [`ViewMutation::FillerText`] with the filler markers stripped, so
/// listeners only ever see user content.
#[derive(Debug)]
pub struct MutationObserver {
    base: ObserverBase,
}

impl MutationObserver {
    pub fn new() -> Self {
        Self {
            base: ObserverBase::new(),
        }
    }
}

impl Default for MutationObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MutationObserver {
    observer_base_impl!(ObserverKind::Mutation);

    fn handle(&mut self, event: &DomEvent, ctx: &ObserverContext<'_>) -> Vec<ViewEvent> {
        let DomEvent::Mutations { root, mutations } = event else {
            return Vec::new();
        };
        if !self.base.accepts(root) {
            return Vec::new();
        }
        let Some(root_id) = ctx.state.root(root).map(|element| element.id()) else {
            return Vec::new();
        };

        let mut translated = Vec::new();
        for mutation in mutations {
            let path = match mutation {
                DomMutation::Text { path, .. } | DomMutation::Children { path } => path,
            };
            let Some(target) = ctx.renderer.resolve_dom_path(root, root_id, path) else {
                debug!(root = %root, ?path, "Skipping mutation of unknown node");
                continue;
            };

            let view_mutation = match (mutation, target) {
                (DomMutation::Text { data, .. }, DomTarget::Filler { position }) => {
                    ViewMutation::FillerText {
                        position,
                        text: strip_inline_filler(data),
                    }
                }
                (DomMutation::Text { data, .. }, DomTarget::Text { id, content }) => {
                    if content == *data {
                        continue;
                    }
                    ViewMutation::Text {
                        node: id,
                        old_text: content,
                        new_text: data.clone(),
                    }
                }
                (DomMutation::Children { .. }, DomTarget::Element { id }) => {
                    ViewMutation::Children { node: id }
                }
                (mutation, target) => {
                    debug!(?mutation, ?target, "Mutation does not match node type");
                    continue;
                }
            };
            translated.push(view_mutation);
        }

        if translated.is_empty() {
            return Vec::new();
        }

        vec![ViewEvent::Mutations {
            root: root.clone(),
            mutations: translated,
        }]
    }
}
