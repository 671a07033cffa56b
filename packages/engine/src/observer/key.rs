use super::{observer_base_impl, Observer, ObserverBase, ObserverContext, ObserverKind};
use crate::events::{DomEvent, ViewEvent};

/// Translates key presses into `keydown` / `keyup`
#[derive(Debug)]
pub struct KeyObserver {
    base: ObserverBase,
}

impl KeyObserver {
    pub fn new() -> Self {
        Self {
            base: ObserverBase::new(),
        }
    }
}

impl Default for KeyObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for KeyObserver {
    observer_base_impl!(ObserverKind::Key);

    fn handle(&mut self, event: &DomEvent, _ctx: &ObserverContext<'_>) -> Vec<ViewEvent> {
        if !self.base.accepts(event.root()) {
            return Vec::new();
        }

        match event {
            DomEvent::KeyDown { root, key } => vec![ViewEvent::KeyDown {
                root: root.clone(),
                key: key.clone(),
            }],
            DomEvent::KeyUp { root, key } => vec![ViewEvent::KeyUp {
                root: root.clone(),
                key: key.clone(),
            }],
            _ => Vec::new(),
        }
    }
}
