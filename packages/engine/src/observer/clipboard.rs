use super::{observer_base_impl, Observer, ObserverBase, ObserverContext, ObserverKind};
use crate::events::{ClipboardMethod, DomEvent, ViewEvent};

/// Translates paste into `clipboardInput` and copy / cut into
/// `clipboardOutput`
#[derive(Debug)]
pub struct ClipboardObserver {
    base: ObserverBase,
}

impl ClipboardObserver {
    pub fn new() -> Self {
        Self {
            base: ObserverBase::new(),
        }
    }
}

impl Default for ClipboardObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ClipboardObserver {
    observer_base_impl!(ObserverKind::Clipboard);

    fn handle(&mut self, event: &DomEvent, _ctx: &ObserverContext<'_>) -> Vec<ViewEvent> {
        if !self.base.accepts(event.root()) {
            return Vec::new();
        }

        let output = |root: &String, method, data_transfer: &crate::events::DataTransfer| {
            vec![ViewEvent::ClipboardOutput {
                root: root.clone(),
                method,
                data_transfer: data_transfer.clone(),
            }]
        };

        match event {
            DomEvent::Paste {
                root,
                data_transfer,
            } => vec![ViewEvent::ClipboardInput {
                root: root.clone(),
                data_transfer: data_transfer.clone(),
            }],
            DomEvent::Copy {
                root,
                data_transfer,
            } => output(root, ClipboardMethod::Copy, data_transfer),
            DomEvent::Cut {
                root,
                data_transfer,
            } => output(root, ClipboardMethod::Cut, data_transfer),
            _ => Vec::new(),
        }
    }
}
