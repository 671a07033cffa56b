//! View layer: nodes, inline styles and element matching

pub mod matcher;
pub mod node;
pub mod styles;

pub use matcher::{MatchedProperties, Matcher, MatcherPattern, Pattern};
pub use node::{
    is_void_element, ElementKind, NodeId, NodeRef, ViewElement, ViewFragment, ViewNode, ViewText,
};
pub use styles::{parse_styles, stringify_styles};
