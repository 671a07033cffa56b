//! Filtering pasted HTML against what the editor was configured to keep

use crate::schema::DataSchema;
use quire_engine::view::{MatchedProperties, Matcher, MatcherPattern};
use quire_engine::{ViewElement, ViewFragment, ViewNode};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Decides which schema elements, attributes, styles and classes survive.
///
/// Only elements the [`DataSchema`] defines are filtered. An allowed one
/// keeps just the properties admitted by `allow_attributes` and not
/// rejected by `disallow_attributes`; one that is not allowed is replaced
/// by its children. Elements outside the schema belong to other editor
/// features and are left as they are.
#[derive(Debug)]
pub struct DataFilter {
    schema: Rc<RefCell<DataSchema>>,
    allowed_elements: Matcher,
    allowed_attributes: Matcher,
    disallowed_attributes: Matcher,
}

impl DataFilter {
    pub fn new(schema: Rc<RefCell<DataSchema>>) -> Self {
        Self {
            schema,
            allowed_elements: Matcher::new(),
            allowed_attributes: Matcher::new(),
            disallowed_attributes: Matcher::new(),
        }
    }

    pub fn schema(&self) -> Rc<RefCell<DataSchema>> {
        Rc::clone(&self.schema)
    }

    /// Keep schema elements matching `pattern`
    pub fn allow_element(&mut self, pattern: MatcherPattern) {
        self.allowed_elements.add(pattern);
    }

    /// Keep the attributes, styles and classes `pattern` admits
    pub fn allow_attributes(&mut self, pattern: MatcherPattern) {
        self.allowed_attributes.add(pattern);
    }

    /// Strip the attributes, styles and classes `pattern` admits, even
    /// when allowed
    pub fn disallow_attributes(&mut self, pattern: MatcherPattern) {
        self.disallowed_attributes.add(pattern);
    }

    pub fn is_allowed(&self, element: &ViewElement) -> bool {
        self.allowed_elements.matches(element)
    }

    pub fn process(&self, fragment: &mut ViewFragment) {
        let schema = self.schema.borrow();
        self.process_children(&schema, fragment.children_mut());
    }

    fn process_children(&self, schema: &DataSchema, children: &mut Vec<ViewNode>) {
        let original = std::mem::take(children);

        for node in original {
            let ViewNode::Element(mut element) = node else {
                children.push(node);
                continue;
            };
            self.process_children(schema, element.children_mut());

            if !schema.has_view(element.name()) {
                children.push(ViewNode::Element(element));
            } else if self.is_allowed(&element) {
                self.strip_properties(&mut element);
                children.push(ViewNode::Element(element));
            } else {
                trace!(element = %element.name(), "Unwrapping element that is not allowed");
                children.extend(element.take_children());
            }
        }
    }

    fn strip_properties(&self, element: &mut ViewElement) {
        let allowed = self
            .allowed_attributes
            .match_properties(element)
            .unwrap_or_default();
        let disallowed = self
            .disallowed_attributes
            .match_properties(element)
            .unwrap_or_default();
        let MatchedProperties {
            attributes,
            styles,
            classes,
        } = &allowed;

        let attributes_to_remove: Vec<String> = element
            .attributes()
            .map(|(key, _)| key.to_string())
            .filter(|key| !keeps(attributes, key, &disallowed.attributes))
            .collect();
        for key in attributes_to_remove {
            element.remove_attribute(&key);
        }

        let styles_to_remove: Vec<String> = element
            .styles()
            .map(|(property, _)| property.to_string())
            .filter(|property| !keeps(styles, property, &disallowed.styles))
            .collect();
        for property in styles_to_remove {
            element.remove_style(&property);
        }

        let classes_to_remove: Vec<String> = element
            .classes()
            .map(str::to_string)
            .filter(|class| !keeps(classes, class, &disallowed.classes))
            .collect();
        for class in classes_to_remove {
            element.remove_class(&class);
        }
    }
}

fn keeps(kept: &[String], key: &str, rejected: &[String]) -> bool {
    kept.iter().any(|k| k == key) && !rejected.iter().any(|k| k == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_engine::view::Pattern;
    use quire_engine::HtmlDataProcessor;

    fn filter() -> DataFilter {
        DataFilter::new(Rc::new(RefCell::new(DataSchema::new())))
    }

    fn run(filter: &DataFilter, html: &str) -> String {
        let processor = HtmlDataProcessor::new();
        let mut fragment = processor.to_view(html).unwrap();
        filter.process(&mut fragment);
        processor.to_data(fragment.children())
    }

    #[test]
    fn test_elements_not_allowed_are_unwrapped() {
        let filter = filter();
        assert_eq!(
            run(&filter, "<section><p>a <span class=\"x\">b</span></p></section>"),
            "<p>a b</p>"
        );
    }

    #[test]
    fn test_elements_outside_schema_are_untouched() {
        let filter = filter();
        assert_eq!(
            run(&filter, "<p class=\"lead\" style=\"color:red\"><b>x</b></p>"),
            "<p class=\"lead\" style=\"color:red\"><b>x</b></p>"
        );
    }

    #[test]
    fn test_allowed_element_loses_other_attributes() {
        let mut filter = filter();
        filter.allow_element(MatcherPattern::name("section"));
        filter.allow_attributes(
            MatcherPattern::name("section")
                .with_attribute("id", Pattern::Any)
                .with_style("color", Pattern::Any),
        );

        assert_eq!(
            run(
                &filter,
                "<section id=\"s\" title=\"t\" class=\"c\" style=\"color:red;margin:0\">x</section>"
            ),
            "<section id=\"s\" style=\"color:red\">x</section>"
        );
    }

    #[test]
    fn test_disallow_wins_over_allow() {
        let mut filter = filter();
        filter.allow_element(MatcherPattern::name("span"));
        filter.allow_attributes(
            MatcherPattern::name("span")
                .with_attribute("/^data-/", Pattern::Any)
                .with_class(Pattern::Any),
        );
        filter.disallow_attributes(
            MatcherPattern::name("span")
                .with_attribute("data-secret", Pattern::Any)
                .with_class(Pattern::exact("internal")),
        );

        assert_eq!(
            run(
                &filter,
                "<p><span data-id=\"1\" data-secret=\"2\" class=\"note internal\">x</span></p>"
            ),
            "<p><span class=\"note\" data-id=\"1\">x</span></p>"
        );
    }

    #[test]
    fn test_regex_element_pattern() {
        let mut filter = filter();
        filter.allow_element(MatcherPattern {
            name: Some(Pattern::parse("/^(article|aside)$/").unwrap()),
            ..Default::default()
        });

        assert_eq!(
            run(&filter, "<article><aside>a</aside><nav>b</nav></article>"),
            "<article><aside>a</aside>b</article>"
        );
    }

    #[test]
    fn test_schema_registered_later_is_used() {
        let filter = filter();
        filter
            .schema()
            .borrow_mut()
            .register_inline_element(crate::schema::DataSchemaDefinition::inline("u", "htmlU"));

        assert_eq!(run(&filter, "<p><u>x</u></p>"), "<p>x</p>");
    }
}
