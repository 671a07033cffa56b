use crate::view::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("Root '{0}' is already registered")]
    DuplicateRoot(String),

    #[error("Root '{0}' not found")]
    RootNotFound(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Node {0} cannot hold children")]
    NotAContainer(NodeId),

    #[error("Notation error at {pos}: {message}")]
    Notation { pos: usize, message: String },

    #[error("Surface rejected patch: {0}")]
    InvalidPatch(String),

    #[error("View tree has been destroyed")]
    Destroyed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HtmlParseError {
    #[error("Element nesting depth {depth} exceeds the limit of {limit}")]
    NestingTooDeep { depth: usize, limit: usize },
}

pub type ViewResult<T> = Result<T, ViewError>;
