//! Turning Word's list paragraphs into real lists.
//!
//! Word does not write `<ul>`/`<ol>` to the clipboard. Each list item is a
//! paragraph (or heading) carrying an `mso-list: l<id> level<n> lfo<n>`
//! style, with the bullet or number rendered as text inside a
//! `mso-list: Ignore` span. The list type lives in the document
//! stylesheet as an `@list l<id>:level<n> { mso-level-number-format: ... }`
//! rule.

use quire_engine::{ViewElement, ViewFragment, ViewNode};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::trace;

static LIST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)l(\d+)").expect("list id pattern is valid"));

static LIST_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)level(\d+)").expect("list level pattern is valid"));

static LIST_ORDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)lfo(\d+)").expect("list order pattern is valid"));

static LIST_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)@list\s+l(\d+):level(\d+)\s*\{([^}]*)").expect("list rule pattern is valid")
});

static NUMBER_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mso-level-number-format:([^;]*);").expect("number format pattern is valid")
});

const ITEM_LIKE_ELEMENTS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Position of a paragraph within a Word list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemData {
    pub id: String,
    pub indent: usize,
    pub order: String,
}

impl ListItemData {
    /// Read the `mso-list` style of an item-like element
    pub fn of(element: &ViewElement) -> Option<Self> {
        if !ITEM_LIKE_ELEMENTS.contains(&element.name()) {
            return None;
        }
        let style = element.get_style("mso-list")?;

        let id = LIST_ID.captures(style)?.get(1)?.as_str().to_string();
        let indent = LIST_LEVEL.captures(style)?.get(1)?.as_str().parse().ok()?;
        let order = LIST_ORDER.captures(style)?.get(1)?.as_str().to_string();

        Some(Self { id, indent, order })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bulleted,
    Numbered,
}

impl ListType {
    pub fn element_name(self) -> &'static str {
        match self {
            ListType::Bulleted => "ul",
            ListType::Numbered => "ol",
        }
    }
}

/// List element and optional `list-style-type` for one list level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListStyle {
    pub list_type: ListType,
    pub style: Option<&'static str>,
}

impl ListStyle {
    /// Style for a `mso-level-number-format` value
    pub fn from_number_format(format: &str) -> Self {
        let format = format.trim().to_ascii_lowercase();
        let list_type = match format.as_str() {
            "bullet" | "image" => ListType::Bulleted,
            _ => ListType::Numbered,
        };
        let style = match format.as_str() {
            "alpha-lower" => Some("lower-alpha"),
            "alpha-upper" => Some("upper-alpha"),
            "roman-lower" => Some("lower-roman"),
            "roman-upper" => Some("upper-roman"),
            "arabic-leading-zero" => Some("decimal-leading-zero"),
            _ => None,
        };

        Self { list_type, style }
    }

    fn create_list(&self) -> ViewElement {
        let mut list = ViewElement::container(self.list_type.element_name());
        if let Some(style) = self.style {
            list.set_style("list-style-type", style);
        }
        list
    }
}

impl Default for ListStyle {
    fn default() -> Self {
        Self::from_number_format("decimal")
    }
}

/// `@list` rules of a stylesheet, keyed by list id and level
#[derive(Debug, Clone, Default)]
pub struct ListDefinitions {
    formats: BTreeMap<(String, usize), String>,
}

impl ListDefinitions {
    pub fn parse(styles: &str) -> Self {
        let mut formats = BTreeMap::new();

        for rule in LIST_RULE.captures_iter(styles) {
            let Ok(level) = rule[2].parse::<usize>() else {
                continue;
            };
            let Some(format) = NUMBER_FORMAT.captures(&rule[3]) else {
                continue;
            };
            let format = format[1].trim();
            if format.is_empty() {
                continue;
            }
            formats
                .entry((rule[1].to_string(), level))
                .or_insert_with(|| format.to_string());
        }

        Self { formats }
    }

    /// List style of an item; numbered (`decimal`) unless a rule says otherwise
    pub fn style_for(&self, item: &ListItemData) -> ListStyle {
        self.formats
            .get(&(item.id.clone(), item.indent))
            .map(|format| ListStyle::from_number_format(format))
            .unwrap_or_default()
    }
}

/// Wrap consecutive Word list paragraphs of `fragment` into `ul`/`ol`
/// lists, nesting them by their level.
pub fn transform_list_item_like_elements_into_lists(fragment: &mut ViewFragment, styles: &str) {
    let definitions = ListDefinitions::parse(styles);
    transform_children(fragment.children_mut(), &definitions);
}

fn transform_children(children: &mut Vec<ViewNode>, definitions: &ListDefinitions) {
    let original = std::mem::take(children);
    let mut builder: Option<ListBuilder> = None;

    for node in original {
        let item = match &node {
            ViewNode::Element(element) => ListItemData::of(element),
            ViewNode::Text(_) => None,
        };

        let (item, element) = match (item, node) {
            (Some(item), ViewNode::Element(element)) => (item, element),
            (_, mut node) => {
                if let Some(list) = builder.take() {
                    children.push(list.finish());
                }
                if let ViewNode::Element(element) = &mut node {
                    transform_children(element.children_mut(), definitions);
                }
                children.push(node);
                continue;
            }
        };

        match builder.as_mut() {
            Some(list) if list.id == item.id => list.add(element, &item, definitions),
            _ => {
                if let Some(list) = builder.take() {
                    children.push(list.finish());
                }
                trace!(id = %item.id, indent = item.indent, "Starting list");
                builder = Some(ListBuilder::start(element, &item, definitions));
            }
        }
    }

    if let Some(list) = builder {
        children.push(list.finish());
    }
}

/// A list being assembled from consecutive items of one Word list.
///
/// `levels[0]` is the top-level list; every further entry is a nested
/// list that goes into the last item of the level above once it is
/// closed. Each entry carries the Word indent of the items it holds, so
/// a list copied from the middle of a nested one (starting at `level2`)
/// still closes at the right place.
struct ListBuilder {
    id: String,
    levels: Vec<(usize, ViewElement)>,
    previous_indent: usize,
}

impl ListBuilder {
    fn start(element: ViewElement, item: &ListItemData, definitions: &ListDefinitions) -> Self {
        let mut list = definitions.style_for(item).create_list();
        list.append_child(into_list_item(element));

        Self {
            id: item.id.clone(),
            levels: vec![(item.indent, list)],
            previous_indent: item.indent,
        }
    }

    fn add(&mut self, element: ViewElement, item: &ListItemData, definitions: &ListDefinitions) {
        if item.indent != self.previous_indent {
            let style = definitions.style_for(item);

            if item.indent > self.current_indent() {
                self.levels.push((item.indent, style.create_list()));
            } else {
                // The top list holds every indent above its parent's
                while self.levels.len() > 1 && self.parent_indent() >= item.indent {
                    self.close_level();
                }
                if let Some((indent, current)) = self.levels.last_mut() {
                    *indent = item.indent;
                    if !current.is(style.list_type.element_name()) {
                        current.rename(style.list_type.element_name());
                    }
                }
            }
        }

        if let Some((_, current)) = self.levels.last_mut() {
            current.append_child(into_list_item(element));
        }
        self.previous_indent = item.indent;
    }

    fn current_indent(&self) -> usize {
        self.levels.last().map_or(0, |(indent, _)| *indent)
    }

    fn parent_indent(&self) -> usize {
        match self.levels.len() {
            0 | 1 => 0,
            len => self.levels[len - 2].0,
        }
    }

    /// Move the innermost list into the last item of its parent list.
    /// Always shrinks `levels` by one.
    fn close_level(&mut self) {
        let Some((_, nested)) = self.levels.pop() else {
            return;
        };
        let Some((_, parent)) = self.levels.last_mut() else {
            self.levels.push((0, nested));
            return;
        };

        match parent.children_mut().last_mut().and_then(ViewNode::as_element_mut) {
            Some(item) => item.append_child(nested),
            None => parent.append_child(ViewElement::container("li").with_child(nested)),
        }
    }

    fn finish(mut self) -> ViewNode {
        while self.levels.len() > 1 {
            self.close_level();
        }
        match self.levels.pop() {
            Some((_, list)) => ViewNode::Element(list),
            None => ViewNode::Element(ViewElement::container("ul")),
        }
    }
}

fn into_list_item(mut element: ViewElement) -> ViewElement {
    remove_bullet_elements(element.children_mut());
    element.rename("li");
    element.remove_style("mso-list");
    element
}

fn is_bullet_element(node: &ViewNode) -> bool {
    node.as_element().is_some_and(|element| {
        element.is("span")
            && element
                .get_style("mso-list")
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("ignore"))
    })
}

/// Remove the `mso-list: Ignore` spans holding the rendered bullet, and
/// spans left empty by their removal. Returns whether anything was removed.
fn remove_bullet_elements(children: &mut Vec<ViewNode>) -> bool {
    let before = children.len();
    children.retain(|child| !is_bullet_element(child));
    let mut removed = children.len() != before;

    children.retain_mut(|child| {
        let ViewNode::Element(element) = child else {
            return true;
        };
        if remove_bullet_elements(element.children_mut()) {
            removed = true;
            return !(element.is("span") && element.is_empty());
        }
        true
    });

    removed
}
