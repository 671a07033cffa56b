use crate::utils::{normalize_clipboard_html, plain_text_to_html, view_to_plain_text};
use quire_common::{Emitter, EventInfo, ListenerId, Priority, SharedEmitter};
use quire_core::{Editor, EditorResult, Plugin, PluginDefinition};
use quire_engine::{ClipboardMethod, DataTransfer, HtmlDataProcessor, ViewEvent, ViewFragment};
use std::rc::Rc;
use tracing::{debug, warn};

/// Name of the event fired for every paste before the content is inserted
pub const INPUT_TRANSFORMATION: &str = "inputTransformation";

/// Payload of [`INPUT_TRANSFORMATION`]. Listeners may replace `content`.
#[derive(Debug, Clone)]
pub struct InputTransformationData {
    pub root: String,
    pub data_transfer: DataTransfer,
    pub content: ViewFragment,
}

/// Turns clipboard events of the view into content insertion and
/// clipboard output.
///
/// Pasted data is converted into a view fragment, handed to the
/// `inputTransformation` listeners in priority order, and inserted at
/// the selection. Copy and cut put the selected content on the event's
/// data transfer as `text/html` and `text/plain`.
#[derive(Debug)]
pub struct Clipboard {
    input_transformation: SharedEmitter<InputTransformationData>,
    view_listeners: Vec<ListenerId>,
}

impl Clipboard {
    /// Emitter other plugins listen to for `inputTransformation`
    pub fn input_transformation(&self) -> SharedEmitter<InputTransformationData> {
        Rc::clone(&self.input_transformation)
    }

    /// Subscribe to `inputTransformation`
    pub fn on_input_transformation<F>(&self, priority: Priority, handler: F) -> ListenerId
    where
        F: FnMut(&mut EventInfo, &mut (), &mut InputTransformationData) + 'static,
    {
        self.input_transformation
            .borrow_mut()
            .listen(INPUT_TRANSFORMATION, priority, handler)
    }
}

impl Plugin for Clipboard {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, editor: &mut Editor) -> EditorResult<()> {
        let processor = editor.data_processor().clone();
        let emitter = Rc::clone(&self.input_transformation);
        let input = editor.view_mut().on(
            "clipboardInput",
            Priority::LOW,
            move |_info, state, event| {
                let ViewEvent::ClipboardInput {
                    root,
                    data_transfer,
                } = event
                else {
                    return;
                };

                let Some(content) = clipboard_content(&processor, data_transfer) else {
                    return;
                };
                let mut data = InputTransformationData {
                    root: root.clone(),
                    data_transfer: data_transfer.clone(),
                    content,
                };
                emitter.borrow_mut().fire(INPUT_TRANSFORMATION, &mut data);

                if data.content.is_empty() {
                    debug!(root = %data.root, "Nothing to paste");
                    return;
                }
                if let Err(err) = state.insert_fragment_at_selection(data.content) {
                    warn!(%err, "Cannot insert pasted content");
                }
            },
        );

        let processor = editor.data_processor().clone();
        let output = editor.view_mut().on(
            "clipboardOutput",
            Priority::LOW,
            move |_info, state, event| {
                let ViewEvent::ClipboardOutput {
                    method,
                    data_transfer,
                    ..
                } = event
                else {
                    return;
                };

                let content = state.selected_content();
                if content.is_empty() {
                    return;
                }
                data_transfer.set_data("text/html", processor.to_data(content.children()));
                data_transfer.set_data("text/plain", view_to_plain_text(content.children()));

                if *method == ClipboardMethod::Cut {
                    if let Err(err) = state.delete_selected_content() {
                        warn!(%err, "Cannot remove cut content");
                    }
                }
            },
        );

        self.view_listeners = vec![input, output];
        Ok(())
    }

    fn destroy(&mut self, editor: &mut Editor) {
        for listener in self.view_listeners.drain(..) {
            editor.view_mut().off(listener);
        }
        self.input_transformation = Emitter::shared();
    }
}

impl PluginDefinition for Clipboard {
    const NAME: &'static str = "Clipboard";

    fn create(_editor: &Editor) -> EditorResult<Self> {
        Ok(Self {
            input_transformation: Emitter::shared(),
            view_listeners: Vec::new(),
        })
    }
}

/// Pasted HTML, or plain text converted to HTML, as a view fragment
fn clipboard_content(
    processor: &HtmlDataProcessor,
    data_transfer: &DataTransfer,
) -> Option<ViewFragment> {
    let html = match data_transfer.get_data("text/html") {
        Some(html) if !html.is_empty() => normalize_clipboard_html(html),
        _ => plain_text_to_html(data_transfer.get_data("text/plain").unwrap_or_default()),
    };

    match processor.to_view(&html) {
        Ok(fragment) => Some(fragment),
        Err(err) => {
            // Deliver the content anyway, with the excess nesting dropped
            warn!(%err, "Clipboard content nests too deep, flattening it");
            let flattening = HtmlDataProcessor::with_parser(
                processor.parser().clone().flatten_past_limit(),
            );
            match flattening.to_view(&html) {
                Ok(fragment) => Some(fragment),
                Err(err) => {
                    warn!(%err, "Cannot parse clipboard content");
                    None
                }
            }
        }
    }
}
