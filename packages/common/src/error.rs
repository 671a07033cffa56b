use thiserror::Error;

/// Errors raised by the shared infrastructure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Neither a named priority nor an integer
    #[error("Unknown priority: {0}")]
    UnknownPriority(String),
}
