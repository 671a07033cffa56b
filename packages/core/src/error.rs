use quire_engine::{HtmlParseError, ViewError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Plugin '{0}' is not loaded")]
    PluginNotFound(String),

    #[error("Plugin dependency cycle: {}", .0.join(" -> "))]
    PluginCycle(Vec<String>),

    #[error("Plugin '{plugin}' failed to initialize: {message}")]
    PluginInit { plugin: String, message: String },

    #[error("View error: {0}")]
    View(#[from] ViewError),

    #[error("HTML error: {0}")]
    Html(#[from] HtmlParseError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EditorResult<T> = Result<T, EditorError>;
