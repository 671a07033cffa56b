//! Observers translate one category of surface events into normalized view
//! notifications.
//!
//! Observers never change view state. They read it (and the renderer's
//! last snapshot, to map DOM paths back to view nodes) and return the
//! notifications the tree then fires to its listeners.

mod clipboard;
mod focus;
mod key;
mod mutation;
mod selection;

pub use clipboard::ClipboardObserver;
pub use focus::FocusObserver;
pub use key::KeyObserver;
pub use mutation::MutationObserver;
pub use selection::SelectionObserver;

use crate::events::{DomEvent, ViewEvent};
use crate::renderer::Renderer;
use crate::tree::ViewState;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Observer categories; a tree holds at most one observer per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObserverKind {
    Mutation,
    Selection,
    Key,
    Clipboard,
    Focus,
}

impl ObserverKind {
    pub const ALL: [ObserverKind; 5] = [
        ObserverKind::Mutation,
        ObserverKind::Selection,
        ObserverKind::Key,
        ObserverKind::Clipboard,
        ObserverKind::Focus,
    ];

    /// Instantiate the built-in observer of this kind
    pub fn create(self) -> Box<dyn Observer> {
        match self {
            ObserverKind::Mutation => Box::new(MutationObserver::new()),
            ObserverKind::Selection => Box::new(SelectionObserver::new()),
            ObserverKind::Key => Box::new(KeyObserver::new()),
            ObserverKind::Clipboard => Box::new(ClipboardObserver::new()),
            ObserverKind::Focus => Box::new(FocusObserver::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ObserverKind::Mutation => "mutation",
            ObserverKind::Selection => "selection",
            ObserverKind::Key => "key",
            ObserverKind::Clipboard => "clipboard",
            ObserverKind::Focus => "focus",
        }
    }
}

impl fmt::Display for ObserverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObserverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObserverKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown observer kind '{}'", s))
    }
}

/// Read-only view of the tree handed to observers
pub struct ObserverContext<'a> {
    pub state: &'a ViewState,
    pub renderer: &'a Renderer,
}

/// Trait for implementing observers
pub trait Observer {
    fn kind(&self) -> ObserverKind;

    fn is_enabled(&self) -> bool;

    fn enable(&mut self);

    /// A disabled observer ignores every event
    fn disable(&mut self);

    /// Start watching the root named `root`
    fn observe(&mut self, root: &str);

    /// Translate an event of this observer's category
    fn handle(&mut self, event: &DomEvent, ctx: &ObserverContext<'_>) -> Vec<ViewEvent>;

    /// Stop watching everything
    fn destroy(&mut self) {
        self.disable();
    }
}

/// Enabled flag and observed roots shared by the built-in observers
#[derive(Debug, Clone)]
pub(crate) struct ObserverBase {
    enabled: bool,
    roots: BTreeSet<String>,
}

impl ObserverBase {
    pub(crate) fn new() -> Self {
        Self {
            enabled: true,
            roots: BTreeSet::new(),
        }
    }

    pub(crate) fn observe(&mut self, root: &str) {
        self.roots.insert(root.to_string());
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn destroy(&mut self) {
        self.enabled = false;
        self.roots.clear();
    }

    /// Whether an event from `root` should be handled
    pub(crate) fn accepts(&self, root: &str) -> bool {
        self.enabled && self.roots.contains(root)
    }
}

/// Implements the bookkeeping part of [`Observer`] for a struct with a
/// `base: ObserverBase` field
macro_rules! observer_base_impl {
    ($kind:expr) => {
        fn kind(&self) -> $crate::observer::ObserverKind {
            $kind
        }

        fn is_enabled(&self) -> bool {
            self.base.is_enabled()
        }

        fn enable(&mut self) {
            self.base.set_enabled(true);
        }

        fn disable(&mut self) {
            self.base.set_enabled(false);
        }

        fn observe(&mut self, root: &str) {
            self.base.observe(root);
        }

        fn destroy(&mut self) {
            self.base.destroy();
        }
    };
}
pub(crate) use observer_base_impl;
