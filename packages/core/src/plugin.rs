use crate::editor::Editor;
use crate::error::EditorResult;
use std::any::Any;
use std::fmt;

/// Type-erasure helper so plugins can be looked up by concrete type
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Trait for implementing editor features
///
/// Lifecycle: every plugin is created in dependency order, then `init`
/// runs for each of them, then `after_init`. `destroy` runs in reverse
/// load order.
pub trait Plugin: AsAny {
    /// Stable plugin name
    fn name(&self) -> &'static str;

    fn init(&mut self, _editor: &mut Editor) -> EditorResult<()> {
        Ok(())
    }

    /// Runs once every plugin is initialized
    fn after_init(&mut self, _editor: &mut Editor) -> EditorResult<()> {
        Ok(())
    }

    fn destroy(&mut self, _editor: &mut Editor) {}
}

/// Static description of a plugin type
pub trait PluginDefinition: Plugin + Sized + 'static {
    /// Registry key; must be unique among loaded plugins
    const NAME: &'static str;

    /// Plugins that have to be loaded (and initialized) before this one
    fn requires() -> Vec<PluginEntry> {
        Vec::new()
    }

    fn create(editor: &Editor) -> EditorResult<Self>;
}

/// Type-erased handle to a [`PluginDefinition`]
#[derive(Clone, Copy)]
pub struct PluginEntry {
    name: &'static str,
    requires: fn() -> Vec<PluginEntry>,
    create: fn(&Editor) -> EditorResult<Box<dyn Plugin>>,
}

impl PluginEntry {
    pub fn of<P: PluginDefinition>() -> Self {
        Self {
            name: P::NAME,
            requires: P::requires,
            create: create_boxed::<P>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn requires(&self) -> Vec<PluginEntry> {
        (self.requires)()
    }

    pub(crate) fn create(&self, editor: &Editor) -> EditorResult<Box<dyn Plugin>> {
        (self.create)(editor)
    }
}

fn create_boxed<P: PluginDefinition>(editor: &Editor) -> EditorResult<Box<dyn Plugin>> {
    Ok(Box::new(P::create(editor)?))
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry").field("name", &self.name).finish()
    }
}

impl PartialEq for PluginEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
