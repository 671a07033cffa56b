use crate::filter::DataFilter;
use crate::schema::DataSchema;
use quire_clipboard::Clipboard;
use quire_common::{ListenerId, Priority};
use quire_core::{Editor, EditorResult, HtmlSupportConfig, Plugin, PluginDefinition, PluginEntry};
use quire_engine::view::MatcherPattern;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Glue plugin creating the [`DataSchema`] and the [`DataFilter`] and
/// running the filter over pasted content
#[derive(Debug)]
pub struct GeneralHtmlSupport {
    data_schema: Rc<RefCell<DataSchema>>,
    data_filter: Rc<RefCell<DataFilter>>,
    listener: Option<ListenerId>,
}

impl GeneralHtmlSupport {
    pub fn data_schema(&self) -> Rc<RefCell<DataSchema>> {
        Rc::clone(&self.data_schema)
    }

    pub fn data_filter(&self) -> Rc<RefCell<DataFilter>> {
        Rc::clone(&self.data_filter)
    }
}

/// Feed `htmlSupport.allow` and `htmlSupport.disallow` into a filter
pub fn apply_config(filter: &mut DataFilter, config: &HtmlSupportConfig) {
    for pattern in &config.allow {
        filter.allow_element(MatcherPattern {
            name: pattern.name.clone(),
            ..MatcherPattern::default()
        });
        filter.allow_attributes(pattern.clone());
    }
    for pattern in &config.disallow {
        filter.disallow_attributes(pattern.clone());
    }
}

impl Plugin for GeneralHtmlSupport {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, editor: &mut Editor) -> EditorResult<()> {
        let config = &editor.config().html_support;
        apply_config(&mut self.data_filter.borrow_mut(), config);
        debug!(
            allow = config.allow.len(),
            disallow = config.disallow.len(),
            "Applied HTML support configuration"
        );

        let filter = Rc::clone(&self.data_filter);
        let clipboard = editor.plugins().require::<Clipboard>()?;
        let listener = clipboard.on_input_transformation(Priority::LOW, move |_, _, data| {
            filter.borrow().process(&mut data.content);
        });
        self.listener = Some(listener);
        Ok(())
    }

    fn destroy(&mut self, editor: &mut Editor) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        if let Some(clipboard) = editor.plugins().get::<Clipboard>() {
            clipboard
                .input_transformation()
                .borrow_mut()
                .stop_listening(listener);
        }
    }
}

impl PluginDefinition for GeneralHtmlSupport {
    const NAME: &'static str = "GeneralHtmlSupport";

    fn requires() -> Vec<PluginEntry> {
        vec![PluginEntry::of::<Clipboard>()]
    }

    fn create(_editor: &Editor) -> EditorResult<Self> {
        let data_schema = Rc::new(RefCell::new(DataSchema::new()));
        let data_filter = Rc::new(RefCell::new(DataFilter::new(Rc::clone(&data_schema))));

        Ok(Self {
            data_schema,
            data_filter,
            listener: None,
        })
    }
}
