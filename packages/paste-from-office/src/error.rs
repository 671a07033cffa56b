use quire_engine::HtmlParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PasteError {
    #[error("Cannot parse pasted content: {0}")]
    Parse(#[from] HtmlParseError),
}

pub type PasteResult<T> = Result<T, PasteError>;
