//! HTML data processing: tokenizer, tree builder and serializer

pub mod entities;
pub mod parser;
pub mod processor;
pub mod serializer;
pub mod tokenizer;

pub use entities::{decode_entities, escape_attribute, escape_text};
pub use parser::{HtmlParser, DEFAULT_MAX_DEPTH};
pub use processor::HtmlDataProcessor;
pub use serializer::{element_to_html, to_html};
pub use tokenizer::HtmlToken;
