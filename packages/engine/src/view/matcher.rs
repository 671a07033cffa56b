//! Pattern matching over view elements.
//!
//! A [`MatcherPattern`] describes an element by name plus optional
//! attribute, style and class constraints. Patterns deserialize from the
//! JSON shape used in configuration:
//!
//! ```json
//! { "name": "/^(p|h[1-6])$/", "attributes": { "dir": true }, "classes": ["lead"] }
//! ```
//!
//! A string wrapped in slashes is a regular expression, `true` matches
//! anything, any other string matches exactly.

use crate::view::node::ViewElement;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single value constraint
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPattern", into = "RawPattern")]
pub enum Pattern {
    Any,
    Exact(String),
    Regex(Regex),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPattern {
    Flag(bool),
    Text(String),
}

impl TryFrom<RawPattern> for Pattern {
    type Error = String;

    fn try_from(raw: RawPattern) -> Result<Self, Self::Error> {
        match raw {
            RawPattern::Flag(true) => Ok(Pattern::Any),
            RawPattern::Flag(false) => Err("`false` is not a valid pattern".to_string()),
            RawPattern::Text(text) => Pattern::parse(&text).map_err(|e| e.to_string()),
        }
    }
}

impl From<Pattern> for RawPattern {
    fn from(pattern: Pattern) -> Self {
        match pattern {
            Pattern::Any => RawPattern::Flag(true),
            Pattern::Exact(text) => RawPattern::Text(text),
            Pattern::Regex(regex) => RawPattern::Text(format!("/{}/", regex.as_str())),
        }
    }
}

impl Pattern {
    /// Parse `/regex/` or an exact string
    pub fn parse(text: &str) -> Result<Self, regex::Error> {
        if text.len() >= 2 && text.starts_with('/') && text.ends_with('/') {
            Regex::new(&text[1..text.len() - 1]).map(Pattern::Regex)
        } else {
            Ok(Pattern::Exact(text.to_string()))
        }
    }

    pub fn exact(text: impl Into<String>) -> Self {
        Pattern::Exact(text.into())
    }

    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Exact(expected) => expected == value,
            Pattern::Regex(regex) => regex.is_match(value),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => write!(f, "Any"),
            Pattern::Exact(text) => write!(f, "Exact({:?})", text),
            Pattern::Regex(regex) => write!(f, "Regex(/{}/)", regex.as_str()),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Pattern::Any, Pattern::Any) => true,
            (Pattern::Exact(a), Pattern::Exact(b)) => a == b,
            (Pattern::Regex(a), Pattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Element description used by filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherPattern {
    pub name: Option<Pattern>,
    /// Attribute name → value constraint
    pub attributes: BTreeMap<String, Pattern>,
    /// Style property → value constraint
    pub styles: BTreeMap<String, Pattern>,
    pub classes: Vec<Pattern>,
}

/// Keys of an element that a pattern matched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedProperties {
    pub attributes: Vec<String>,
    pub styles: Vec<String>,
    pub classes: Vec<String>,
}

impl MatchedProperties {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.styles.is_empty() && self.classes.is_empty()
    }

    pub fn merge(&mut self, other: MatchedProperties) {
        self.attributes.extend(other.attributes);
        self.styles.extend(other.styles);
        self.classes.extend(other.classes);
    }
}

impl MatcherPattern {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(Pattern::exact(name)),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, pattern: Pattern) -> Self {
        self.attributes.insert(key.into(), pattern);
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, pattern: Pattern) -> Self {
        self.styles.insert(property.into(), pattern);
        self
    }

    pub fn with_class(mut self, pattern: Pattern) -> Self {
        self.classes.push(pattern);
        self
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.as_ref().map_or(true, |pattern| pattern.is_match(name))
    }

    /// Whether the element satisfies every constraint of this pattern
    pub fn matches(&self, element: &ViewElement) -> bool {
        if !self.matches_name(element.name()) {
            return false;
        }

        let attributes_ok = self.attributes.iter().all(|(key, pattern)| {
            element
                .get_attribute(key)
                .map_or(false, |value| pattern.is_match(value))
        });

        let styles_ok = self.styles.iter().all(|(property, pattern)| {
            element
                .get_style(property)
                .map_or(false, |value| pattern.is_match(value))
        });

        let classes_ok = self
            .classes
            .iter()
            .all(|pattern| element.classes().any(|class| pattern.is_match(class)));

        attributes_ok && styles_ok && classes_ok
    }

    /// Properties of `element` admitted by this pattern.
    ///
    /// Unlike [`MatcherPattern::matches`], constraint keys may themselves be
    /// patterns: the key `"/^data-/"` admits every `data-*` attribute.
    pub fn match_properties(&self, element: &ViewElement) -> Option<MatchedProperties> {
        if !self.matches_name(element.name()) {
            return None;
        }

        let mut matched = MatchedProperties::default();

        for (key, value) in element.attributes() {
            if admits(&self.attributes, key, value) {
                matched.attributes.push(key.to_string());
            }
        }

        for (property, value) in element.styles() {
            if admits(&self.styles, property, value) {
                matched.styles.push(property.to_string());
            }
        }

        for class in element.classes() {
            if self.classes.iter().any(|pattern| pattern.is_match(class)) {
                matched.classes.push(class.to_string());
            }
        }

        Some(matched)
    }
}

fn admits(constraints: &BTreeMap<String, Pattern>, key: &str, value: &str) -> bool {
    constraints.iter().any(|(constraint_key, pattern)| {
        let key_ok = match Pattern::parse(constraint_key) {
            Ok(key_pattern) => key_pattern.is_match(key),
            Err(_) => constraint_key == key,
        };
        key_ok && pattern.is_match(value)
    })
}

/// Ordered set of patterns; an element matches if any pattern does
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matcher {
    patterns: Vec<MatcherPattern>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: MatcherPattern) {
        self.patterns.push(pattern);
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, element: &ViewElement) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(element))
    }

    /// Union of properties admitted by every pattern matching the element name
    pub fn match_properties(&self, element: &ViewElement) -> Option<MatchedProperties> {
        let mut result: Option<MatchedProperties> = None;

        for pattern in &self.patterns {
            if let Some(matched) = pattern.match_properties(element) {
                result.get_or_insert_with(Default::default).merge(matched);
            }
        }

        result
    }
}
