//! # Quire Core
//!
//! Editor lifecycle and the plugin system.
//!
//! ```text
//! Editor::create(config, [PluginEntry])
//!     │
//!     ├── ViewTree + one MemorySurface per configured root
//!     ├── resolve_order ──► dependencies first, cycles rejected
//!     ├── create  (in order)
//!     ├── init    (in order)
//!     └── after_init (in order)
//! ```
//!
//! Plugins reach each other through [`PluginCollection::get`], keyed by
//! their [`PluginDefinition::NAME`].

pub mod collection;
pub mod config;
pub mod editor;
pub mod error;
pub mod plugin;

pub use collection::{resolve_order, PluginCollection};
pub use config::{EditorConfig, HtmlSupportConfig, PasteFromOfficeConfig, DEFAULT_CONFIG_NAME};
pub use editor::{Editor, EditorState};
pub use error::{EditorError, EditorResult};
pub use plugin::{AsAny, Plugin, PluginDefinition, PluginEntry};
