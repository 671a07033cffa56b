//! # Quire Clipboard
//!
//! ```text
//! paste ──► clipboardInput ──► Clipboard ──► inputTransformation (HIGH → LOW) ──► insert at selection
//! copy / cut ──► clipboardOutput ──► Clipboard ──► text/html + text/plain (+ delete on cut)
//! ```

pub mod clipboard;
pub mod utils;

pub use clipboard::{Clipboard, InputTransformationData, INPUT_TRANSFORMATION};
pub use utils::{normalize_clipboard_html, plain_text_to_html, view_to_plain_text};
