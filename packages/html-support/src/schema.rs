//! Registry of HTML elements that have no dedicated editor feature

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How a view element maps onto the document model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSchemaDefinition {
    /// View element name
    pub view: String,
    /// Model element (or attribute, for inline elements) name
    pub model: String,
    #[serde(default)]
    pub is_block: bool,
    #[serde(default)]
    pub is_inline: bool,
    /// Model names allowed as children; `$block` and `$text` stand for
    /// any block or any text
    #[serde(default)]
    pub allow_children: Vec<String>,
}

impl DataSchemaDefinition {
    pub fn block(view: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            model: model.into(),
            is_block: true,
            is_inline: false,
            allow_children: Vec::new(),
        }
    }

    pub fn inline(view: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            model: model.into(),
            is_block: false,
            is_inline: true,
            allow_children: Vec::new(),
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_children = children.into_iter().map(Into::into).collect();
        self
    }
}

const DEFAULT_BLOCKS: &[(&str, &str, &[&str])] = &[
    ("address", "htmlAddress", &["$block"]),
    ("article", "htmlArticle", &["$block"]),
    ("aside", "htmlAside", &["$block"]),
    ("details", "htmlDetails", &["htmlSummary", "$block"]),
    ("div", "htmlDiv", &["$block"]),
    ("footer", "htmlFooter", &["$block"]),
    ("header", "htmlHeader", &["$block"]),
    ("hgroup", "htmlHgroup", &["$block"]),
    ("main", "htmlMain", &["$block"]),
    ("nav", "htmlNav", &["$block"]),
    ("section", "htmlSection", &["$block"]),
    ("summary", "htmlSummary", &["$text"]),
    ("center", "htmlCenter", &["$block"]),
    ("dir", "htmlDir", &["$block"]),
    ("menu", "htmlMenu", &["$block"]),
];

const DEFAULT_INLINES: &[(&str, &str)] = &[
    ("abbr", "htmlAbbr"),
    ("acronym", "htmlAcronym"),
    ("bdi", "htmlBdi"),
    ("bdo", "htmlBdo"),
    ("big", "htmlBig"),
    ("cite", "htmlCite"),
    ("data", "htmlData"),
    ("del", "htmlDel"),
    ("dfn", "htmlDfn"),
    ("font", "htmlFont"),
    ("ins", "htmlIns"),
    ("kbd", "htmlKbd"),
    ("mark", "htmlMark"),
    ("q", "htmlQ"),
    ("samp", "htmlSamp"),
    ("small", "htmlSmall"),
    ("span", "htmlSpan"),
    ("time", "htmlTime"),
    ("tt", "htmlTt"),
    ("var", "htmlVar"),
];

/// Element definitions keyed by model name.
///
/// Registering a definition for a model name that is already known
/// replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct DataSchema {
    definitions: BTreeMap<String, DataSchemaDefinition>,
}

impl DataSchema {
    /// Schema with the default block and inline definitions
    pub fn new() -> Self {
        let mut schema = Self::empty();

        for (view, model, children) in DEFAULT_BLOCKS {
            schema.register_block_element(
                DataSchemaDefinition::block(*view, *model).with_children(children.iter().copied()),
            );
        }
        for (view, model) in DEFAULT_INLINES {
            schema.register_inline_element(DataSchemaDefinition::inline(*view, *model));
        }

        schema
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register_block_element(&mut self, mut definition: DataSchemaDefinition) {
        definition.is_block = true;
        definition.is_inline = false;
        self.register(definition);
    }

    pub fn register_inline_element(&mut self, mut definition: DataSchemaDefinition) {
        definition.is_block = false;
        definition.is_inline = true;
        self.register(definition);
    }

    fn register(&mut self, definition: DataSchemaDefinition) {
        debug!(view = %definition.view, model = %definition.model, "Registering schema definition");
        self.definitions.insert(definition.model.clone(), definition);
    }

    /// Definitions whose view element is `view`
    pub fn definitions_for_view(&self, view: &str) -> Vec<&DataSchemaDefinition> {
        self.definitions
            .values()
            .filter(|definition| definition.view == view)
            .collect()
    }

    pub fn definitions_for_model(&self, model: &str) -> Vec<&DataSchemaDefinition> {
        self.definitions.get(model).into_iter().collect()
    }

    pub fn has_view(&self, view: &str) -> bool {
        self.definitions.values().any(|definition| definition.view == view)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &DataSchemaDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
