//! Recognizing HTML produced by Microsoft Word

use regex::Regex;
use std::sync::LazyLock;

static GENERATOR_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s*name="?generator"?\s*content="?microsoft\s*word\s*\d+"?/?>"#)
        .expect("generator meta pattern is valid")
});

/// Decides whether pasted HTML came from Word
pub trait WordDetector {
    fn is_word_input(&self, html: Option<&str>) -> bool;
}

/// Looks for the `<meta name="Generator" content="Microsoft Word NN">`
/// tag Word writes into the clipboard HTML.
///
/// This is a signature match: HTML that merely contains such a tag is
/// treated as Word output.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorMetaDetector;

impl WordDetector for GeneratorMetaDetector {
    fn is_word_input(&self, html: Option<&str>) -> bool {
        match html {
            Some(html) if !html.is_empty() => GENERATOR_META.is_match(html),
            _ => false,
        }
    }
}

/// [`GeneratorMetaDetector`] as a function
pub fn is_word_input(html: Option<&str>) -> bool {
    GeneratorMetaDetector.is_word_input(html)
}
