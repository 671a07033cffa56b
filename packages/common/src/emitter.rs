//! # Event Emitter
//!
//! Prioritized publish/subscribe registry.
//!
//! Every emitter is an event *source*; subscriptions are keyed by event
//! name and carry a numeric [`Priority`]. Firing an event invokes the
//! matching listeners synchronously, highest priority first. Listeners
//! registered with equal priority run in registration order.
//!
//! ```text
//! listen("inputTransformation", HIGH)   ──┐
//! listen("inputTransformation", NORMAL) ──┼──► fire() ──► HIGH → NORMAL → LOW
//! listen("inputTransformation", LOW)    ──┘
//! ```
//!
//! A listener may call [`EventInfo::stop`] to prevent lower-priority
//! listeners from running, or [`EventInfo::off`] to unsubscribe itself.

use crate::error::CommonError;
use crate::result::CommonResult;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use tracing::trace;

/// Listener priority. Higher values run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(i32);

impl Priority {
    pub const HIGHEST: Priority = Priority(100_000);
    pub const HIGH: Priority = Priority(1_000);
    pub const NORMAL: Priority = Priority(0);
    pub const LOW: Priority = Priority(-1_000);
    pub const LOWEST: Priority = Priority(-100_000);

    pub const fn new(value: i32) -> Self {
        Priority(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// Parse a named priority (`"high"`) or a plain integer (`"250"`)
    pub fn parse(value: &str) -> CommonResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "highest" => Ok(Self::HIGHEST),
            "high" => Ok(Self::HIGH),
            "normal" => Ok(Self::NORMAL),
            "low" => Ok(Self::LOW),
            "lowest" => Ok(Self::LOWEST),
            other => other
                .parse::<i32>()
                .map(Priority)
                .map_err(|_| CommonError::UnknownPriority(value.to_string())),
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl FromStr for Priority {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::HIGHEST => write!(f, "highest"),
            Self::HIGH => write!(f, "high"),
            Self::NORMAL => write!(f, "normal"),
            Self::LOW => write!(f, "low"),
            Self::LOWEST => write!(f, "lowest"),
            Priority(value) => write!(f, "{}", value),
        }
    }
}

/// Handle returned by [`Emitter::listen`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Per-dispatch information handed to every listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInfo {
    name: String,
    stopped: bool,
    remove_current: bool,
}

impl EventInfo {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stopped: false,
            remove_current: false,
        }
    }

    /// Name of the event being fired
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop propagation to the remaining (lower priority) listeners
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Unsubscribe the listener that is currently running
    pub fn off(&mut self) {
        self.remove_current = true;
    }
}

type Handler<E, C> = Box<dyn FnMut(&mut EventInfo, &mut C, &mut E)>;

struct Listener<E, C> {
    id: ListenerId,
    event: String,
    priority: Priority,
    handler: Handler<E, C>,
}

/// Event source with prioritized listeners.
///
/// `E` is the event payload, `C` an optional context handed to every
/// listener alongside the payload (for example the state the event
/// describes).
pub struct Emitter<E, C = ()> {
    listeners: Vec<Listener<E, C>>,
    next_id: u64,
}

/// Emitter shared between a plugin and the listeners other plugins attach.
///
/// Listeners must not subscribe to the same emitter while it is firing.
pub type SharedEmitter<E, C = ()> = Rc<RefCell<Emitter<E, C>>>;

impl<E, C> Emitter<E, C> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Create an emitter wrapped for sharing
    pub fn shared() -> SharedEmitter<E, C> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Subscribe to `event` with the given priority
    pub fn listen<F>(&mut self, event: impl Into<String>, priority: Priority, handler: F) -> ListenerId
    where
        F: FnMut(&mut EventInfo, &mut C, &mut E) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        let listener = Listener {
            id,
            event: event.into(),
            priority,
            handler: Box::new(handler),
        };

        // Keep the list sorted: after every listener with priority >= ours
        let index = self
            .listeners
            .iter()
            .position(|existing| existing.priority < priority)
            .unwrap_or(self.listeners.len());

        trace!(event = %listener.event, %priority, index, "Adding listener");
        self.listeners.insert(index, listener);

        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn stop_listening(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    /// Remove every listener of an event
    pub fn stop_listening_to(&mut self, event: &str) {
        self.listeners.retain(|listener| listener.event != event);
    }

    pub fn has_listeners(&self, event: &str) -> bool {
        self.listeners.iter().any(|listener| listener.event == event)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Fire `event`, handing `context` and `data` to each listener in priority order
    pub fn fire_with(&mut self, event: &str, context: &mut C, data: &mut E) -> EventInfo {
        let mut info = EventInfo::new(event);
        let mut removed = Vec::new();

        for listener in self.listeners.iter_mut().filter(|l| l.event == event) {
            (listener.handler)(&mut info, context, data);

            if info.remove_current {
                removed.push(listener.id);
                info.remove_current = false;
            }

            if info.stopped {
                break;
            }
        }

        if !removed.is_empty() {
            self.listeners.retain(|listener| !removed.contains(&listener.id));
        }

        info
    }
}

impl<E> Emitter<E, ()> {
    /// Fire an event that carries no context
    pub fn fire(&mut self, event: &str, data: &mut E) -> EventInfo {
        self.fire_with(event, &mut (), data)
    }
}

impl<E, C> Default for Emitter<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C> fmt::Debug for Emitter<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &format!("{} listeners", self.listeners.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listeners_run_in_priority_order() {
        let mut emitter: Emitter<Vec<&'static str>> = Emitter::new();

        emitter.listen("paste", Priority::LOW, |_, _, log| log.push("low"));
        emitter.listen("paste", Priority::HIGHEST, |_, _, log| log.push("highest"));
        emitter.listen("paste", Priority::NORMAL, |_, _, log| log.push("normal"));
        emitter.listen("paste", Priority::HIGH, |_, _, log| log.push("high"));

        let mut log = Vec::new();
        emitter.fire("paste", &mut log);

        assert_eq!(log, vec!["highest", "high", "normal", "low"]);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let mut emitter: Emitter<Vec<u32>> = Emitter::new();

        for n in 0..4 {
            emitter.listen("event", Priority::NORMAL, move |_, _, log| log.push(n));
        }

        let mut log = Vec::new();
        emitter.fire("event", &mut log);

        assert_eq!(log, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_only_matching_event_listeners_run() {
        let mut emitter: Emitter<u32> = Emitter::new();
        emitter.listen("a", Priority::NORMAL, |_, _, n| *n += 1);
        emitter.listen("b", Priority::NORMAL, |_, _, n| *n += 100);

        let mut count = 0;
        emitter.fire("a", &mut count);
        assert_eq!(count, 1);
        assert!(emitter.has_listeners("b"));
        assert!(!emitter.has_listeners("c"));
    }

    #[test]
    fn test_stop_halts_propagation() {
        let mut emitter: Emitter<Vec<&'static str>> = Emitter::new();

        emitter.listen("event", Priority::HIGH, |info, _, log| {
            log.push("high");
            info.stop();
        });
        emitter.listen("event", Priority::NORMAL, |_, _, log| log.push("normal"));

        let mut log = Vec::new();
        let info = emitter.fire("event", &mut log);

        assert!(info.is_stopped());
        assert_eq!(log, vec!["high"]);
    }

    #[test]
    fn test_off_removes_current_listener_only() {
        let mut emitter: Emitter<u32> = Emitter::new();
        emitter.listen("event", Priority::NORMAL, |info, _, n| {
            *n += 1;
            info.off();
        });
        emitter.listen("event", Priority::NORMAL, |_, _, n| *n += 10);

        let mut count = 0;
        emitter.fire("event", &mut count);
        emitter.fire("event", &mut count);

        assert_eq!(count, 21);
        assert_eq!(emitter.listener_count(), 1);
    }

    #[test]
    fn test_stop_listening() {
        let mut emitter: Emitter<u32> = Emitter::new();
        let id = emitter.listen("event", Priority::NORMAL, |_, _, n| *n += 1);

        assert!(emitter.stop_listening(id));
        assert!(!emitter.stop_listening(id));

        let mut count = 0;
        emitter.fire("event", &mut count);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_stop_listening_to_event() {
        let mut emitter: Emitter<u32> = Emitter::new();
        emitter.listen("a", Priority::NORMAL, |_, _, n| *n += 1);
        emitter.listen("a", Priority::HIGH, |_, _, n| *n += 1);
        emitter.listen("b", Priority::NORMAL, |_, _, n| *n += 10);

        emitter.stop_listening_to("a");
        assert!(!emitter.has_listeners("a"));
        assert!(emitter.has_listeners("b"));

        let mut count = 0;
        emitter.fire("a", &mut count);
        emitter.fire("b", &mut count);
        assert_eq!(count, 10);
    }

    #[test]
    fn test_context_is_passed_to_listeners() {
        let mut emitter: Emitter<u32, String> = Emitter::new();
        emitter.listen("event", Priority::NORMAL, |_, ctx, n| {
            ctx.push_str("seen");
            *n = ctx.len() as u32;
        });

        let mut ctx = String::new();
        let mut n = 0;
        emitter.fire_with("event", &mut ctx, &mut n);

        assert_eq!(ctx, "seen");
        assert_eq!(n, 4);
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::HIGH);
        assert_eq!("LOWEST".parse::<Priority>().unwrap(), Priority::LOWEST);
        assert_eq!("250".parse::<Priority>().unwrap(), Priority::new(250));
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::HIGH.to_string(), "high");
        assert_eq!(Priority::new(7).to_string(), "7");
    }
}
