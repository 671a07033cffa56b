//! External (DOM-level) input events and the normalized view
//! notifications observers turn them into.

use crate::observer::ObserverKind;
use crate::selection::{Position, Selection};
use crate::surface::DomSelection;
use crate::view::NodeId;
use std::collections::BTreeMap;

/// Clipboard payload keyed by mime type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    data: BTreeMap<String, String>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, mime: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_data(mime, value);
        self
    }

    pub fn get_data(&self, mime: &str) -> Option<&str> {
        self.data.get(mime).map(String::as_str)
    }

    pub fn set_data(&mut self, mime: impl Into<String>, value: impl Into<String>) {
        self.data.insert(mime.into(), value.into());
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Key press data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyData {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyData {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// `Ctrl+Shift+A` style description
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.meta {
            parts.push("Meta");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key.as_str());
        parts.join("+")
    }
}

/// A change observed on a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomMutation {
    /// Character data of the text node at `path` changed
    Text { path: Vec<usize>, data: String },
    /// Child list of the element at `path` changed
    Children { path: Vec<usize> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Mutations { root: String, mutations: Vec<DomMutation> },
    SelectionChange { root: String, selection: Option<DomSelection> },
    KeyDown { root: String, key: KeyData },
    KeyUp { root: String, key: KeyData },
    Paste { root: String, data_transfer: DataTransfer },
    Copy { root: String, data_transfer: DataTransfer },
    Cut { root: String, data_transfer: DataTransfer },
    Focus { root: String },
    Blur { root: String },
}

impl DomEvent {
    pub fn root(&self) -> &str {
        match self {
            DomEvent::Mutations { root, .. }
            | DomEvent::SelectionChange { root, .. }
            | DomEvent::KeyDown { root, .. }
            | DomEvent::KeyUp { root, .. }
            | DomEvent::Paste { root, .. }
            | DomEvent::Copy { root, .. }
            | DomEvent::Cut { root, .. }
            | DomEvent::Focus { root }
            | DomEvent::Blur { root } => root,
        }
    }

    /// Observer kind responsible for this event
    pub fn category(&self) -> ObserverKind {
        match self {
            DomEvent::Mutations { .. } => ObserverKind::Mutation,
            DomEvent::SelectionChange { .. } => ObserverKind::Selection,
            DomEvent::KeyDown { .. } | DomEvent::KeyUp { .. } => ObserverKind::Key,
            DomEvent::Paste { .. } | DomEvent::Copy { .. } | DomEvent::Cut { .. } => {
                ObserverKind::Clipboard
            }
            DomEvent::Focus { .. } | DomEvent::Blur { .. } => ObserverKind::Focus,
        }
    }
}

/// A mutation translated to view terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMutation {
    Text {
        node: NodeId,
        old_text: String,
        new_text: String,
    },
    /// Text typed into the inline filler; it belongs at `position`
    FillerText { position: Position, text: String },
    Children { node: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMethod {
    Copy,
    Cut,
}

/// Normalized notification fired on the view tree
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Mutations {
        root: String,
        mutations: Vec<ViewMutation>,
    },
    SelectionChange {
        root: String,
        old_selection: Selection,
        new_selection: Selection,
    },
    KeyDown {
        root: String,
        key: KeyData,
    },
    KeyUp {
        root: String,
        key: KeyData,
    },
    ClipboardInput {
        root: String,
        data_transfer: DataTransfer,
    },
    ClipboardOutput {
        root: String,
        method: ClipboardMethod,
        data_transfer: DataTransfer,
    },
    Focus {
        root: String,
    },
    Blur {
        root: String,
    },
    /// Application-defined notification fired through [`crate::ViewTree::fire`]
    Custom {
        name: String,
        payload: String,
    },
}

impl ViewEvent {
    /// Event name listeners subscribe to
    pub fn name(&self) -> &str {
        match self {
            ViewEvent::Mutations { .. } => "mutations",
            ViewEvent::SelectionChange { .. } => "selectionChange",
            ViewEvent::KeyDown { .. } => "keydown",
            ViewEvent::KeyUp { .. } => "keyup",
            ViewEvent::ClipboardInput { .. } => "clipboardInput",
            ViewEvent::ClipboardOutput { .. } => "clipboardOutput",
            ViewEvent::Focus { .. } => "focus",
            ViewEvent::Blur { .. } => "blur",
            ViewEvent::Custom { name, .. } => name,
        }
    }

    pub fn root(&self) -> Option<&str> {
        match self {
            ViewEvent::Mutations { root, .. }
            | ViewEvent::SelectionChange { root, .. }
            | ViewEvent::KeyDown { root, .. }
            | ViewEvent::KeyUp { root, .. }
            | ViewEvent::ClipboardInput { root, .. }
            | ViewEvent::ClipboardOutput { root, .. }
            | ViewEvent::Focus { root }
            | ViewEvent::Blur { root } => Some(root),
            ViewEvent::Custom { .. } => None,
        }
    }
}
