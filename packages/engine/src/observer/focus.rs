use super::{observer_base_impl, Observer, ObserverBase, ObserverContext, ObserverKind};
use crate::events::{DomEvent, ViewEvent};

/// Translates focus changes into `focus` / `blur`
#[derive(Debug)]
pub struct FocusObserver {
    base: ObserverBase,
}

impl FocusObserver {
    pub fn new() -> Self {
        Self {
            base: ObserverBase::new(),
        }
    }
}

impl Default for FocusObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for FocusObserver {
    observer_base_impl!(ObserverKind::Focus);

    fn handle(&mut self, event: &DomEvent, ctx: &ObserverContext<'_>) -> Vec<ViewEvent> {
        if !self.base.accepts(event.root()) {
            return Vec::new();
        }

        match event {
            // Focusing the root that already has focus is not a change
            DomEvent::Focus { root } if ctx.state.focused_root() == Some(root.as_str()) => Vec::new(),
            DomEvent::Focus { root } => vec![ViewEvent::Focus { root: root.clone() }],
            DomEvent::Blur { root } => vec![ViewEvent::Blur { root: root.clone() }],
            _ => Vec::new(),
        }
    }
}
