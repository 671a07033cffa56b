use crate::collection::{resolve_order, PluginCollection};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::plugin::{Plugin, PluginEntry};
use quire_engine::{
    HtmlDataProcessor, MemorySurface, Position, Selection, ViewError, ViewNode, ViewTree,
};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Initializing,
    Ready,
    Destroyed,
}

/// A headless editor: a view tree bound to in-memory surfaces plus the
/// plugins that implement its features
pub struct Editor {
    config: EditorConfig,
    view: ViewTree,
    surfaces: BTreeMap<String, MemorySurface>,
    data_processor: HtmlDataProcessor,
    plugins: PluginCollection,
    load_order: Vec<&'static str>,
    state: EditorState,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("state", &self.state)
            .field("roots", &self.view.root_names())
            .field("plugins", &self.load_order)
            .finish()
    }
}

impl Editor {
    /// Create an editor, load `plugins` (and their requirements) and run
    /// their lifecycle hooks
    pub fn create(config: EditorConfig, plugins: &[PluginEntry]) -> EditorResult<Self> {
        let mut view = ViewTree::with_default_observers();
        let mut surfaces = BTreeMap::new();
        for name in &config.roots {
            let surface = MemorySurface::default();
            view.create_root(surface.clone(), name)?;
            surfaces.insert(name.clone(), surface);
        }

        let data_processor = HtmlDataProcessor::new();
        let mut editor = Self {
            config,
            view,
            surfaces,
            data_processor,
            plugins: PluginCollection::new(),
            load_order: Vec::new(),
            state: EditorState::Initializing,
        };

        let order = resolve_order(plugins)?;
        editor.load_order = order.iter().map(PluginEntry::name).collect();
        info!(plugins = ?editor.load_order, "Loading plugins");

        for entry in &order {
            let plugin = entry.create(&editor)?;
            editor.plugins.insert(plugin);
        }

        for name in editor.load_order.clone() {
            debug!(plugin = name, "Initializing plugin");
            editor.with_plugin(name, |plugin, editor| plugin.init(editor))?;
        }
        for name in editor.load_order.clone() {
            editor.with_plugin(name, |plugin, editor| plugin.after_init(editor))?;
        }

        editor.view.render()?;
        editor.state = EditorState::Ready;
        Ok(editor)
    }

    /// Run a hook with the plugin lent out of the collection, so the hook
    /// can use the rest of the editor mutably
    fn with_plugin<R>(
        &mut self,
        name: &'static str,
        hook: impl FnOnce(&mut dyn Plugin, &mut Editor) -> EditorResult<R>,
    ) -> EditorResult<R> {
        let mut plugin = self
            .plugins
            .take(name)
            .ok_or_else(|| EditorError::PluginNotFound(name.to_string()))?;
        let result = hook(plugin.as_mut(), self);
        self.plugins.restore(plugin);
        result
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn view(&self) -> &ViewTree {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTree {
        &mut self.view
    }

    pub fn plugins(&self) -> &PluginCollection {
        &self.plugins
    }

    pub fn data_processor(&self) -> &HtmlDataProcessor {
        &self.data_processor
    }

    /// Surface the root named `root` renders onto
    pub fn surface(&self, root: &str) -> Option<&MemorySurface> {
        self.surfaces.get(root)
    }

    /// Serialize a root to HTML
    pub fn get_data(&self, root: &str) -> EditorResult<String> {
        let element = self
            .view
            .root(root)
            .ok_or_else(|| ViewError::RootNotFound(root.to_string()))?;
        Ok(self.data_processor.to_data(element.children()))
    }

    /// Replace a root's content with parsed HTML. The caret is placed at
    /// the start of the first text, or cleared when there is no text.
    pub fn set_data(&mut self, root: &str, html: &str) -> EditorResult<()> {
        let fragment = self.data_processor.to_view(html)?;

        self.view.change(|view| -> EditorResult<()> {
            let element = view
                .root_mut(root)
                .ok_or_else(|| ViewError::RootNotFound(root.to_string()))?;
            element.take_children();
            element.append_children(fragment.into_children());

            let selection = first_text_position(element.children())
                .map(Selection::collapsed)
                .unwrap_or_default();
            view.set_selection(selection)?;
            Ok(())
        })??;

        debug!(root, "Data set");
        Ok(())
    }

    /// Tear down plugins in reverse load order, then the view
    pub fn destroy(&mut self) {
        if self.state == EditorState::Destroyed {
            return;
        }

        for name in self.load_order.clone().into_iter().rev() {
            debug!(plugin = name, "Destroying plugin");
            let _ = self.with_plugin(name, |plugin, editor| {
                plugin.destroy(editor);
                Ok(())
            });
        }

        self.plugins.clear();
        self.view.destroy();
        self.state = EditorState::Destroyed;
        info!("Editor destroyed");
    }
}

fn first_text_position(children: &[ViewNode]) -> Option<Position> {
    children.iter().find_map(|child| match child {
        ViewNode::Text(text) => Some(Position::new(text.id(), 0)),
        ViewNode::Element(element) => first_text_position(element.children()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginDefinition;
    use std::cell::RefCell;
    use std::rc::Rc;

    thread_local! {
        static EVENTS: RefCell<Vec<String>> = RefCell::new(Vec::new());
    }

    fn record(event: String) {
        EVENTS.with(|events| events.borrow_mut().push(event));
    }

    fn take_events() -> Vec<String> {
        EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
    }

    struct Logger {
        seen_roots: usize,
    }

    impl Plugin for Logger {
        fn name(&self) -> &'static str {
            Self::NAME
        }

        fn init(&mut self, editor: &mut Editor) -> EditorResult<()> {
            self.seen_roots = editor.view().root_names().len();
            record("Logger.init".to_string());
            Ok(())
        }

        fn after_init(&mut self, _editor: &mut Editor) -> EditorResult<()> {
            record("Logger.after_init".to_string());
            Ok(())
        }

        fn destroy(&mut self, _editor: &mut Editor) {
            record("Logger.destroy".to_string());
        }
    }

    impl PluginDefinition for Logger {
        const NAME: &'static str = "Logger";

        fn create(_editor: &Editor) -> EditorResult<Self> {
            record("Logger.create".to_string());
            Ok(Logger { seen_roots: 0 })
        }
    }

    struct Toolbar {
        counter: Rc<RefCell<usize>>,
    }

    impl Plugin for Toolbar {
        fn name(&self) -> &'static str {
            Self::NAME
        }

        fn init(&mut self, editor: &mut Editor) -> EditorResult<()> {
            // Dependencies are initialized and reachable
            let logger = editor.plugins().require::<Logger>()?;
            *self.counter.borrow_mut() = logger.seen_roots;
            record("Toolbar.init".to_string());
            Ok(())
        }

        fn destroy(&mut self, _editor: &mut Editor) {
            record("Toolbar.destroy".to_string());
        }
    }

    impl PluginDefinition for Toolbar {
        const NAME: &'static str = "Toolbar";

        fn requires() -> Vec<PluginEntry> {
            vec![PluginEntry::of::<Logger>()]
        }

        fn create(editor: &Editor) -> EditorResult<Self> {
            assert!(editor.plugins().get::<Logger>().is_some());
            record("Toolbar.create".to_string());
            Ok(Toolbar {
                counter: Rc::new(RefCell::new(0)),
            })
        }
    }

    struct Failing;

    impl Plugin for Failing {
        fn name(&self) -> &'static str {
            Self::NAME
        }

        fn init(&mut self, _editor: &mut Editor) -> EditorResult<()> {
            Err(EditorError::PluginInit {
                plugin: Self::NAME.to_string(),
                message: "boom".to_string(),
            })
        }
    }

    impl PluginDefinition for Failing {
        const NAME: &'static str = "Failing";

        fn create(_editor: &Editor) -> EditorResult<Self> {
            Ok(Failing)
        }
    }

    #[test]
    fn test_lifecycle_order() {
        take_events();
        let mut editor = Editor::create(EditorConfig::default(), &[PluginEntry::of::<Toolbar>()]).unwrap();

        assert_eq!(editor.state(), EditorState::Ready);
        assert_eq!(editor.plugins().names(), vec!["Logger", "Toolbar"]);
        assert_eq!(*editor.plugins().get::<Toolbar>().unwrap().counter.borrow(), 1);

        editor.destroy();
        assert_eq!(editor.state(), EditorState::Destroyed);
        assert!(editor.plugins().is_empty());

        assert_eq!(
            take_events(),
            vec![
                "Logger.create",
                "Toolbar.create",
                "Logger.init",
                "Toolbar.init",
                "Logger.after_init",
                "Toolbar.destroy",
                "Logger.destroy",
            ]
        );
    }

    #[test]
    fn test_failing_init_aborts_creation() {
        let result = Editor::create(EditorConfig::default(), &[PluginEntry::of::<Failing>()]);
        assert!(matches!(result, Err(EditorError::PluginInit { .. })));
    }

    #[test]
    fn test_roots_from_config() {
        let config = EditorConfig {
            roots: vec!["title".to_string(), "body".to_string()],
            ..EditorConfig::default()
        };
        let editor = Editor::create(config, &[]).unwrap();

        assert_eq!(editor.view().root_names(), vec!["body", "title"]);
        assert!(editor.surface("title").is_some());
        assert!(editor.surface("main").is_none());
    }

    #[test]
    fn test_set_and_get_data() {
        let mut editor = Editor::create(EditorConfig::default(), &[]).unwrap();
        editor.set_data("main", "<p>Hello <b>world</b></p>").unwrap();

        assert_eq!(editor.get_data("main").unwrap(), "<p>Hello <b>world</b></p>");
        assert_eq!(
            editor.surface("main").unwrap().to_html(),
            "<p>Hello <b>world</b></p>"
        );
        assert!(editor.view().selection().is_collapsed());
        assert!(matches!(
            editor.get_data("missing"),
            Err(EditorError::View(ViewError::RootNotFound(_)))
        ));
    }
}
