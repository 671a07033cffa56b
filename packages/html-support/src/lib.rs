//! # Quire HTML Support
//!
//! Keeps HTML that no editor feature understands, within configured limits.
//!
//! ```text
//! GeneralHtmlSupport
//!     ├── DataSchema   view element ⇄ model name, block / inline
//!     └── DataFilter   allow / disallow patterns
//!             │
//!             └── inputTransformation (LOW) ──► strip or unwrap schema elements
//! ```

pub mod filter;
pub mod general_html_support;
pub mod schema;

pub use filter::DataFilter;
pub use general_html_support::{apply_config, GeneralHtmlSupport};
pub use schema::{DataSchema, DataSchemaDefinition};
