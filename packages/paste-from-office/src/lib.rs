//! # Quire Paste from Office
//!
//! ```text
//! inputTransformation (HIGH)
//!     │
//!     ├── WordDetector::is_word_input(text/html) ── no ──► content unchanged
//!     │
//!     └── yes ──► parse_html ──► body + styles
//!                     │
//!                     └── transform_list_item_like_elements_into_lists
//!                             │
//!                             └──► data.content
//! ```

pub mod detect;
pub mod error;
pub mod filters;
pub mod paste_from_office;

pub use detect::{is_word_input, GeneratorMetaDetector, WordDetector};
pub use error::{PasteError, PasteResult};
pub use filters::{parse_html, transform_list_item_like_elements_into_lists, ParsedHtml};
pub use paste_from_office::{normalize_word_input, PasteFromOffice, PasteGate};
