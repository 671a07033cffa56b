//! # Quire Engine
//!
//! View layer of the quire editing framework.
//!
//! ```text
//!  surface events ──► observers ──► ViewTree emitter ──► listeners
//!                                        │
//!                                        ▼
//!  HTML ◄──► HtmlDataProcessor ◄──► ViewState (roots, selection)
//!                                        │
//!                                        ▼
//!                                    Renderer ──► RenderSurface
//! ```

pub mod dev_utils;
pub mod error;
pub mod events;
pub mod html;
pub mod observer;
pub mod renderer;
pub mod selection;
pub mod surface;
pub mod tree;
pub mod view;

pub use error::{HtmlParseError, ViewError, ViewResult};
pub use events::{
    ClipboardMethod, DataTransfer, DomEvent, DomMutation, KeyData, ViewEvent, ViewMutation,
};
pub use html::{HtmlDataProcessor, HtmlParser};
pub use observer::{Observer, ObserverKind};
pub use renderer::{RenderStats, Renderer, INLINE_FILLER, INLINE_FILLER_LENGTH};
pub use selection::{Position, Selection};
pub use surface::{DomPosition, DomSelection, MemorySurface, RenderSurface};
pub use tree::{ViewState, ViewTree};
pub use view::{ElementKind, NodeId, ViewElement, ViewFragment, ViewNode, ViewText};

pub use quire_common::{EventInfo, ListenerId, Priority};
