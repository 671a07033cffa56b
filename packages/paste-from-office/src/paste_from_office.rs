use crate::detect::{GeneratorMetaDetector, WordDetector};
use crate::error::PasteResult;
use crate::filters::{parse_html, transform_list_item_like_elements_into_lists, ParsedHtml};
use quire_clipboard::{Clipboard, InputTransformationData};
use quire_common::{ListenerId, Priority};
use quire_core::{Editor, EditorResult, Plugin, PluginDefinition, PluginEntry};
use quire_engine::html::DEFAULT_MAX_DEPTH;
use quire_engine::ViewFragment;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Parse Word HTML and rebuild its lists
pub fn normalize_word_input(html: &str, max_depth: usize) -> PasteResult<ViewFragment> {
    let ParsedHtml {
        mut body,
        styles_string,
        ..
    } = parse_html(html, max_depth)?;
    transform_list_item_like_elements_into_lists(&mut body, &styles_string);
    Ok(body)
}

/// Decides which pasted content gets the Word treatment and applies it
pub struct PasteGate {
    detector: Box<dyn WordDetector>,
    max_nesting_depth: usize,
}

impl fmt::Debug for PasteGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasteGate")
            .field("max_nesting_depth", &self.max_nesting_depth)
            .finish_non_exhaustive()
    }
}

impl Default for PasteGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl PasteGate {
    pub fn new(max_nesting_depth: usize) -> Self {
        Self {
            detector: Box::new(GeneratorMetaDetector),
            max_nesting_depth,
        }
    }

    pub fn set_detector(&mut self, detector: impl WordDetector + 'static) {
        self.detector = Box::new(detector);
    }

    pub fn is_word_input(&self, html: Option<&str>) -> bool {
        self.detector.is_word_input(html)
    }

    /// Normalized fragment for Word HTML, `None` for anything else.
    ///
    /// Parse failures are logged and reported as `None` so the caller
    /// keeps the content it already has.
    pub fn normalize(&self, html: Option<&str>) -> Option<ViewFragment> {
        let is_word = self.is_word_input(html);
        debug!(is_word, "Classified pasted content");

        let html = html.filter(|_| is_word)?;
        match normalize_word_input(html, self.max_nesting_depth) {
            Ok(content) => Some(content),
            Err(err) => {
                warn!(%err, "Pasting Word content without normalization");
                None
            }
        }
    }

    /// Replace the paste content when the clipboard HTML came from Word
    pub fn handle_input_transformation(&self, data: &mut InputTransformationData) {
        if let Some(content) = self.normalize(data.data_transfer.get_data("text/html")) {
            debug!(root = %data.root, nodes = content.child_count(), "Normalized Word content");
            data.content = content;
        }
    }
}

/// Normalizes content pasted from Microsoft Word.
///
/// Listens to the clipboard's `inputTransformation` at high priority, so
/// the rebuilt lists are what lower priority listeners (like the HTML
/// filter) see.
#[derive(Debug)]
pub struct PasteFromOffice {
    gate: Rc<RefCell<PasteGate>>,
    enabled: bool,
    listener: Option<ListenerId>,
}

impl PasteFromOffice {
    pub fn gate(&self) -> Rc<RefCell<PasteGate>> {
        Rc::clone(&self.gate)
    }

    /// Swap the Word detection strategy
    pub fn set_detector(&self, detector: impl WordDetector + 'static) {
        self.gate.borrow_mut().set_detector(detector);
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }
}

impl Plugin for PasteFromOffice {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, editor: &mut Editor) -> EditorResult<()> {
        if !self.enabled {
            debug!("Paste from Office is disabled");
            return Ok(());
        }

        let gate = Rc::clone(&self.gate);
        let clipboard = editor.plugins().require::<Clipboard>()?;
        let listener = clipboard.on_input_transformation(Priority::HIGH, move |_, _, data| {
            gate.borrow().handle_input_transformation(data);
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

impl PluginDefinition for PasteFromOffice {
    const NAME: &'static str = "PasteFromOffice";

    fn requires() -> Vec<PluginEntry> {
        vec![PluginEntry::of::<Clipboard>()]
    }

    fn create(editor: &Editor) -> EditorResult<Self> {
        let config = &editor.config().paste_from_office;
        Ok(Self {
            gate: Rc::new(RefCell::new(PasteGate::new(config.max_nesting_depth))),
            enabled: config.enabled,
            listener: None,
        })
    }
}
