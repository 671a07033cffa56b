//! Registry of loaded plugins.
//!
//! Plugins are keyed by their stable [`PluginDefinition::NAME`] and kept
//! in load order. Dependencies are resolved depth first: a plugin always
//! loads after everything it requires.

use crate::error::{EditorError, EditorResult};
use crate::plugin::{Plugin, PluginDefinition, PluginEntry};
use std::collections::HashMap;
use std::fmt;

pub struct PluginCollection {
    // `None` while the plugin is lent out to run a lifecycle hook
    slots: Vec<(&'static str, Option<Box<dyn Plugin>>)>,
}

impl PluginCollection {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Typed lookup
    pub fn get<P: PluginDefinition>(&self) -> Option<&P> {
        let plugin = self.get_by_name(P::NAME)?;
        plugin.as_any().downcast_ref::<P>()
    }

    pub fn get_mut<P: PluginDefinition>(&mut self) -> Option<&mut P> {
        let plugin = self
            .slots
            .iter_mut()
            .find(|(name, _)| *name == P::NAME)
            .and_then(|(_, slot)| slot.as_mut())?;
        plugin.as_mut().as_any_mut().downcast_mut::<P>()
    }

    /// Typed lookup that fails with [`EditorError::PluginNotFound`]
    pub fn require<P: PluginDefinition>(&self) -> EditorResult<&P> {
        self.get::<P>()
            .ok_or_else(|| EditorError::PluginNotFound(P::NAME.to_string()))
    }

    pub fn get_by_name(&self, name: &str) -> Option<&dyn Plugin> {
        self.slots
            .iter()
            .find(|(slot_name, _)| *slot_name == name)
            .and_then(|(_, slot)| slot.as_deref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.slots.iter().any(|(slot_name, _)| *slot_name == name)
    }

    /// Plugin names in load order
    pub fn names(&self) -> Vec<&'static str> {
        self.slots.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn insert(&mut self, plugin: Box<dyn Plugin>) {
        let name = plugin.name();
        match self.slots.iter_mut().find(|(slot_name, _)| *slot_name == name) {
            Some((_, slot)) => *slot = Some(plugin),
            None => self.slots.push((name, Some(plugin))),
        }
    }

    /// Lend a plugin out; it stays registered under its name
    pub(crate) fn take(&mut self, name: &str) -> Option<Box<dyn Plugin>> {
        self.slots
            .iter_mut()
            .find(|(slot_name, _)| *slot_name == name)
            .and_then(|(_, slot)| slot.take())
    }

    pub(crate) fn restore(&mut self, plugin: Box<dyn Plugin>) {
        self.insert(plugin);
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

impl Default for PluginCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCollection")
            .field("plugins", &self.names())
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Order `entries` and everything they require so that every plugin comes
/// after its dependencies. Duplicates are loaded once.
pub fn resolve_order(entries: &[PluginEntry]) -> EditorResult<Vec<PluginEntry>> {
    let mut visits = HashMap::new();
    let mut stack = Vec::new();
    let mut order = Vec::new();

    for entry in entries {
        visit(*entry, &mut visits, &mut stack, &mut order)?;
    }

    Ok(order)
}

fn visit(
    entry: PluginEntry,
    visits: &mut HashMap<&'static str, Visit>,
    stack: &mut Vec<&'static str>,
    order: &mut Vec<PluginEntry>,
) -> EditorResult<()> {
    match visits.get(entry.name()) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::InProgress) => {
            let start = stack
                .iter()
                .position(|name| *name == entry.name())
                .unwrap_or(0);
            let mut cycle: Vec<String> = stack[start..].iter().map(|name| name.to_string()).collect();
            cycle.push(entry.name().to_string());
            return Err(EditorError::PluginCycle(cycle));
        }
        None => {}
    }

    visits.insert(entry.name(), Visit::InProgress);
    stack.push(entry.name());

    for dependency in entry.requires() {
        visit(dependency, visits, stack, order)?;
    }

    stack.pop();
    visits.insert(entry.name(), Visit::Done);
    order.push(entry);
    Ok(())
}
