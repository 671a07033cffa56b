use crate::html::{escape_attribute, escape_text};
use crate::view::{is_void_element, NodeId, ViewElement, ViewNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rendered node, as last written to a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<VNode>,
        /// View node this element was rendered from
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<NodeId>,
    },

    Text {
        content: String,
        /// `None` for render-only text such as the inline filler
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<NodeId>,
    },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            id: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
            id: None,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_id(mut self, new_id: NodeId) -> Self {
        match self {
            VNode::Element { ref mut id, .. } | VNode::Text { ref mut id, .. } => {
                *id = Some(new_id);
            }
        }
        self
    }

    pub fn id(&self) -> Option<NodeId> {
        match self {
            VNode::Element { id, .. } | VNode::Text { id, .. } => *id,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            VNode::Text { .. } => &[],
        }
    }

    /// Snapshot of a view node
    pub fn from_view(node: &ViewNode) -> Self {
        match node {
            ViewNode::Text(text) => VNode::text(text.data()).with_id(text.id()),
            ViewNode::Element(element) => Self::from_element(element),
        }
    }

    pub fn from_element(element: &ViewElement) -> Self {
        VNode::Element {
            tag: element.name().to_string(),
            attributes: element.rendered_attributes(),
            children: element.children().iter().map(VNode::from_view).collect(),
            id: Some(element.id()),
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            VNode::Text { content, .. } => content.clone(),
            VNode::Element { children, .. } => children.iter().map(VNode::text_content).collect(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(self, &mut out);
        out
    }
}

pub fn vnodes_to_html(nodes: &[VNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_html(node, &mut out);
    }
    out
}

fn write_html(node: &VNode, out: &mut String) {
    match node {
        VNode::Text { content, .. } => out.push_str(&escape_text(content)),
        VNode::Element {
            tag,
            attributes,
            children,
            ..
        } => {
            out.push('<');
            out.push_str(tag);
            for (key, value) in attributes {
                out.push_str(&format!(" {}=\"{}\"", key, escape_attribute(value)));
            }
            out.push('>');

            if is_void_element(tag) {
                return;
            }

            for child in children {
                write_html(child, out);
            }
            out.push_str(&format!("</{}>", tag));
        }
    }
}

/// Node at a child-index path below `nodes`
pub fn node_at_path<'a>(nodes: &'a [VNode], path: &[usize]) -> Option<&'a VNode> {
    let (first, rest) = path.split_first()?;
    let node = nodes.get(*first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at_path(node.children(), rest)
    }
}
