//! # View Nodes
//!
//! The view is an in-memory tree of elements and text, distinct from the
//! document model, that the renderer reconciles onto a surface.
//!
//! Every node carries a process-unique [`NodeId`]. Positions and selections
//! reference nodes by id, so ids stay stable when nodes move between
//! parents. Structural equality (`PartialEq`) ignores ids: two fragments
//! built from the same input compare equal.

use crate::view::styles::{parse_styles, stringify_styles};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a view node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role of an element in the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Block-level structure (`p`, `li`, `div`)
    Container,
    /// Inline formatting wrapper (`strong`, `span`)
    Attribute,
    /// Element that never has children (`img`, `br`)
    Empty,
    /// Root bound to a rendering surface
    Root,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "del", "dfn", "em", "font", "i", "ins",
    "kbd", "mark", "q", "s", "samp", "small", "span", "strike", "strong", "sub", "sup", "u",
    "var",
];

/// HTML elements that are serialized without a closing tag
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

impl ElementKind {
    /// Prefix used by the view notation (`<container:p>`)
    pub fn prefix(self) -> &'static str {
        match self {
            ElementKind::Container => "container",
            ElementKind::Attribute => "attribute",
            ElementKind::Empty => "empty",
            ElementKind::Root => "root",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "container" => Some(ElementKind::Container),
            "attribute" => Some(ElementKind::Attribute),
            "empty" => Some(ElementKind::Empty),
            "root" => Some(ElementKind::Root),
            _ => None,
        }
    }

    /// Kind given to an element parsed from HTML
    pub fn for_html_name(name: &str) -> Self {
        if is_void_element(name) {
            ElementKind::Empty
        } else if INLINE_ELEMENTS.contains(&name) {
            ElementKind::Attribute
        } else {
            ElementKind::Container
        }
    }
}

/// Text node
#[derive(Debug, Clone)]
pub struct ViewText {
    id: NodeId,
    data: String,
}

impl ViewText {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            data: data.into(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    /// Length in characters (offsets into text are character offsets)
    pub fn char_len(&self) -> usize {
        self.data.chars().count()
    }

    /// Characters in `[from, to)`
    pub fn slice(&self, from: usize, to: usize) -> String {
        self.data
            .chars()
            .skip(from)
            .take(to.saturating_sub(from))
            .collect()
    }
}

impl PartialEq for ViewText {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

/// Element node
#[derive(Debug, Clone)]
pub struct ViewElement {
    id: NodeId,
    name: String,
    kind: ElementKind,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    children: Vec<ViewNode>,
}

impl PartialEq for ViewElement {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.attributes == other.attributes
            && self.styles == other.styles
            && self.classes == other.classes
            && self.children == other.children
    }
}

impl ViewElement {
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            kind,
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            classes: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn container(name: impl Into<String>) -> Self {
        Self::new(ElementKind::Container, name)
    }

    pub fn attribute_element(name: impl Into<String>) -> Self {
        Self::new(ElementKind::Attribute, name)
    }

    pub fn empty_element(name: impl Into<String>) -> Self {
        Self::new(ElementKind::Empty, name)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // Attributes -----------------------------------------------------------

    /// Plain attribute value. `style` and `class` are exposed through the
    /// style and class accessors instead.
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        match key {
            "style" => !self.styles.is_empty(),
            "class" => !self.classes.is_empty(),
            _ => self.attributes.contains_key(key),
        }
    }

    /// Set an attribute. `style` and `class` values are parsed.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().to_ascii_lowercase();
        let value = value.into();

        match key.as_str() {
            "style" => {
                self.styles = parse_styles(&value).into_iter().collect();
            }
            "class" => {
                self.classes = value.split_whitespace().map(str::to_string).collect();
            }
            _ => {
                self.attributes.insert(key, value);
            }
        }
    }

    pub fn remove_attribute(&mut self, key: &str) -> bool {
        match key {
            "style" => {
                let had = !self.styles.is_empty();
                self.styles.clear();
                had
            }
            "class" => {
                let had = !self.classes.is_empty();
                self.classes.clear();
                had
            }
            _ => self.attributes.remove(key).is_some(),
        }
    }

    /// Plain attributes, sorted by key
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All attributes as they are written out, `class` and `style` included
    pub fn rendered_attributes(&self) -> BTreeMap<String, String> {
        let mut attributes = self.attributes.clone();

        if !self.classes.is_empty() {
            let classes: Vec<&str> = self.classes.iter().map(String::as_str).collect();
            attributes.insert("class".to_string(), classes.join(" "));
        }

        if !self.styles.is_empty() {
            attributes.insert("style".to_string(), stringify_styles(self.styles()));
        }

        attributes
    }

    // Styles ---------------------------------------------------------------

    pub fn get_style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    pub fn has_style(&self, property: &str) -> bool {
        self.styles.contains_key(property)
    }

    pub fn set_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.styles
            .insert(property.into().to_ascii_lowercase(), value.into());
    }

    pub fn remove_style(&mut self, property: &str) -> bool {
        self.styles.remove(property).is_some()
    }

    pub fn styles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.styles.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // Classes --------------------------------------------------------------

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        self.classes.insert(class.into());
    }

    pub fn remove_class(&mut self, class: &str) -> bool {
        self.classes.remove(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    // Children -------------------------------------------------------------

    pub fn children(&self) -> &[ViewNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<ViewNode> {
        &mut self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn append_child(&mut self, child: impl Into<ViewNode>) {
        self.children.push(child.into());
    }

    pub fn append_children(&mut self, children: impl IntoIterator<Item = ViewNode>) {
        self.children.extend(children);
    }

    /// Insert at `index`, clamped to the child count
    pub fn insert_child(&mut self, index: usize, child: impl Into<ViewNode>) {
        let index = index.min(self.children.len());
        self.children.insert(index, child.into());
    }

    pub fn remove_child(&mut self, index: usize) -> Option<ViewNode> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    pub fn take_children(&mut self) -> Vec<ViewNode> {
        std::mem::take(&mut self.children)
    }

    // Builders -------------------------------------------------------------

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_style(property, value);
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_child(mut self, child: impl Into<ViewNode>) -> Self {
        self.append_child(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ViewNode>) -> Self {
        self.append_children(children);
        self
    }

    // Queries --------------------------------------------------------------

    /// Concatenated data of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Find this element or a descendant by id
    pub fn find(&self, id: NodeId) -> Option<NodeRef<'_>> {
        if self.id == id {
            return Some(NodeRef::Element(self));
        }
        find_in(&self.children, id)
    }

    /// Child-index path from this element to a descendant (empty for self)
    pub fn path_to(&self, id: NodeId) -> Option<Vec<usize>> {
        if self.id == id {
            return Some(Vec::new());
        }
        path_in(&self.children, id)
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeRef<'_>> {
        match path.split_first() {
            None => Some(NodeRef::Element(self)),
            Some((&index, rest)) => match self.children.get(index)? {
                ViewNode::Element(element) => element.node_at_path(rest),
                ViewNode::Text(text) if rest.is_empty() => Some(NodeRef::Text(text)),
                ViewNode::Text(_) => None,
            },
        }
    }

    /// Element at `path` (self for an empty path)
    pub fn element_at_path_mut(&mut self, path: &[usize]) -> Option<&mut ViewElement> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => match self.children.get_mut(index)? {
                ViewNode::Element(element) => element.element_at_path_mut(rest),
                ViewNode::Text(_) => None,
            },
        }
    }

    /// Copy without children, with a fresh id
    pub fn shallow_clone(&self) -> Self {
        Self {
            id: NodeId::next(),
            name: self.name.clone(),
            kind: self.kind,
            attributes: self.attributes.clone(),
            styles: self.styles.clone(),
            classes: self.classes.clone(),
            children: Vec::new(),
        }
    }

    /// Full copy with fresh ids for every node
    pub fn deep_clone(&self) -> Self {
        let mut copy = self.shallow_clone();
        copy.children = self.children.iter().map(ViewNode::deep_clone).collect();
        copy
    }
}

/// Any view node
#[derive(Debug, Clone, PartialEq)]
pub enum ViewNode {
    Element(ViewElement),
    Text(ViewText),
}

impl ViewNode {
    pub fn text(data: impl Into<String>) -> Self {
        ViewNode::Text(ViewText::new(data))
    }

    pub fn id(&self) -> NodeId {
        match self {
            ViewNode::Element(element) => element.id(),
            ViewNode::Text(text) => text.id(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ViewNode::Text(_))
    }

    /// True for an element with the given name
    pub fn is_element_named(&self, name: &str) -> bool {
        matches!(self, ViewNode::Element(element) if element.is(name))
    }

    pub fn as_element(&self) -> Option<&ViewElement> {
        match self {
            ViewNode::Element(element) => Some(element),
            ViewNode::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ViewElement> {
        match self {
            ViewNode::Element(element) => Some(element),
            ViewNode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&ViewText> {
        match self {
            ViewNode::Text(text) => Some(text),
            ViewNode::Element(_) => None,
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            ViewNode::Element(element) => element.text_content(),
            ViewNode::Text(text) => text.data.clone(),
        }
    }

    pub fn find(&self, id: NodeId) -> Option<NodeRef<'_>> {
        match self {
            ViewNode::Element(element) => element.find(id),
            ViewNode::Text(text) if text.id == id => Some(NodeRef::Text(text)),
            ViewNode::Text(_) => None,
        }
    }

    /// Full copy with fresh ids
    pub fn deep_clone(&self) -> Self {
        match self {
            ViewNode::Element(element) => ViewNode::Element(element.deep_clone()),
            ViewNode::Text(text) => ViewNode::Text(ViewText::new(text.data.clone())),
        }
    }
}

impl From<ViewElement> for ViewNode {
    fn from(element: ViewElement) -> Self {
        ViewNode::Element(element)
    }
}

impl From<ViewText> for ViewNode {
    fn from(text: ViewText) -> Self {
        ViewNode::Text(text)
    }
}

/// Borrowed reference to a node found by id
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Element(&'a ViewElement),
    Text(&'a ViewText),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Element(element) => element.id(),
            NodeRef::Text(text) => text.id(),
        }
    }

    /// Largest valid offset inside this node
    pub fn max_offset(&self) -> usize {
        match self {
            NodeRef::Element(element) => element.child_count(),
            NodeRef::Text(text) => text.char_len(),
        }
    }
}

/// Ordered list of nodes that is not attached to any root
#[derive(Debug, Clone)]
pub struct ViewFragment {
    id: NodeId,
    children: Vec<ViewNode>,
}

impl Default for ViewFragment {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ViewFragment {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl ViewFragment {
    pub fn new() -> Self {
        Self::from_children(Vec::new())
    }

    pub fn from_children(children: Vec<ViewNode>) -> Self {
        Self {
            id: NodeId::next(),
            children,
        }
    }

    /// Id used by positions that point directly into the fragment
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn children(&self) -> &[ViewNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<ViewNode> {
        &mut self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn append_child(&mut self, child: impl Into<ViewNode>) {
        self.children.push(child.into());
    }

    pub fn into_children(self) -> Vec<ViewNode> {
        self.children
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn find(&self, id: NodeId) -> Option<NodeRef<'_>> {
        find_in(&self.children, id)
    }

    pub fn path_to(&self, id: NodeId) -> Option<Vec<usize>> {
        if self.id == id {
            return Some(Vec::new());
        }
        path_in(&self.children, id)
    }

    /// Full copy with fresh ids
    pub fn deep_clone(&self) -> Self {
        Self::from_children(self.children.iter().map(ViewNode::deep_clone).collect())
    }
}

pub(crate) fn find_in(children: &[ViewNode], id: NodeId) -> Option<NodeRef<'_>> {
    children.iter().find_map(|child| child.find(id))
}

pub(crate) fn path_in(children: &[ViewNode], id: NodeId) -> Option<Vec<usize>> {
    for (index, child) in children.iter().enumerate() {
        if child.id() == id {
            return Some(vec![index]);
        }

        if let ViewNode::Element(element) = child {
            if let Some(mut path) = path_in(&element.children, id) {
                path.insert(0, index);
                return Some(path);
            }
        }
    }
    None
}

fn collect_text(children: &[ViewNode], out: &mut String) {
    for child in children {
        match child {
            ViewNode::Text(text) => out.push_str(&text.data),
            ViewNode::Element(element) => collect_text(&element.children, out),
        }
    }
}
