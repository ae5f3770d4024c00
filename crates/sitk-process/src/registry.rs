//! Bookkeeping of the commands registered with one process object.

use std::rc::{Rc, Weak};

use crate::command::{CommandId, CommandInner};
use crate::context::ExecutionContext;
use crate::event::EventKind;

/// One registration of a command for an event kind.
///
/// The tag is the registration token handed out by the active execution
/// context. It stays at [`EventCommand::UNSET_TAG`] while the owning process
/// is not executing.
#[derive(Debug, Clone)]
pub struct EventCommand {
    event: EventKind,
    command_id: CommandId,
    command: Weak<CommandInner>,
    tag: u64,
}

impl EventCommand {
    /// Tag value of a registration that is not forwarded to a context.
    pub const UNSET_TAG: u64 = u64::MAX;

    /// The event kind the command registered for.
    #[inline]
    pub fn event(&self) -> EventKind {
        self.event
    }

    /// The identity of the registered command.
    #[inline]
    pub fn command_id(&self) -> CommandId {
        self.command_id
    }

    /// The token of the forwarded registration, or [`EventCommand::UNSET_TAG`].
    #[inline]
    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// Returns true while the registration is forwarded to a context.
    #[inline]
    pub fn is_forwarded(&self) -> bool {
        self.tag != Self::UNSET_TAG
    }

    fn forward(&mut self, context: &ExecutionContext) {
        debug_assert!(!self.is_forwarded(), "registration forwarded twice");
        self.tag = context.add_observer(self.event, self.command.clone());
    }

    fn unforward(&mut self, context: &ExecutionContext) {
        if self.is_forwarded() {
            context.remove_observer(self.tag);
            self.tag = Self::UNSET_TAG;
        }
    }
}

/// Map from event kind to the commands registered for it.
///
/// Registering the same command twice for the same event is allowed and
/// produces two entries; removal always drops every entry of a command.
#[derive(Debug, Default)]
pub struct EventObserverRegistry {
    entries: Vec<EventCommand>,
}

impl EventObserverRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry; forwards it at once when `context` is given.
    pub(crate) fn attach(
        &mut self,
        event: EventKind,
        command_id: CommandId,
        command: Weak<CommandInner>,
        context: Option<&ExecutionContext>,
    ) -> &EventCommand {
        let mut entry = EventCommand {
            event,
            command_id,
            command,
            tag: EventCommand::UNSET_TAG,
        };
        if let Some(context) = context {
            entry.forward(context);
        }
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Removes every entry of `command_id`, un-forwarding the forwarded ones.
    ///
    /// Returns the number of removed entries.
    pub(crate) fn detach_all(
        &mut self,
        command_id: CommandId,
        context: Option<&ExecutionContext>,
    ) -> usize {
        let before = self.entries.len();
        self.entries.retain_mut(|entry| {
            if entry.command_id != command_id {
                return true;
            }
            if let Some(context) = context {
                entry.unforward(context);
            }
            false
        });
        before - self.entries.len()
    }

    /// Removes every entry and returns the commands that are still alive.
    pub(crate) fn clear(&mut self, context: Option<&ExecutionContext>) -> Vec<Rc<CommandInner>> {
        let mut alive: Vec<Rc<CommandInner>> = Vec::new();
        for mut entry in self.entries.drain(..) {
            if let Some(context) = context {
                entry.unforward(context);
            }
            if let Some(command) = entry.command.upgrade() {
                if !alive.iter().any(|c| Rc::ptr_eq(c, &command)) {
                    alive.push(command);
                }
            }
        }
        alive
    }

    /// Forwards every entry onto `context`.
    pub(crate) fn forward_all(&mut self, context: &ExecutionContext) {
        for entry in self.entries.iter_mut() {
            entry.forward(context);
        }
    }

    /// Un-forwards every forwarded entry from `context`.
    pub(crate) fn unforward_all(&mut self, context: &ExecutionContext) {
        for entry in self.entries.iter_mut() {
            entry.unforward(context);
        }
    }

    /// Returns true if an entry exists for `event` or for [`EventKind::Any`].
    pub fn has_command(&self, event: EventKind) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.event == event || entry.event == EventKind::Any)
    }

    /// Returns true if `command_id` has at least one entry.
    pub fn contains(&self, command_id: CommandId) -> bool {
        self.entries.iter().any(|e| e.command_id == command_id)
    }

    /// All entries, in registration order.
    pub fn entries(&self) -> &[EventCommand] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn test_attach_without_context() {
        let mut registry = EventObserverRegistry::new();
        let command = Command::new();
        let entry = registry.attach(EventKind::Start, command.id(), command.downgrade(), None);
        assert_eq!(entry.event(), EventKind::Start);
        assert_eq!(entry.tag(), EventCommand::UNSET_TAG);
        assert!(!entry.is_forwarded());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_has_command_matches_any() {
        let mut registry = EventObserverRegistry::new();
        let command = Command::new();
        assert!(!registry.has_command(EventKind::Start));

        registry.attach(EventKind::End, command.id(), command.downgrade(), None);
        assert!(registry.has_command(EventKind::End));
        assert!(!registry.has_command(EventKind::Start));

        registry.attach(EventKind::Any, command.id(), command.downgrade(), None);
        for event in EventKind::ALL {
            assert!(registry.has_command(event));
        }
    }

    #[test]
    fn test_forward_and_unforward() {
        let mut registry = EventObserverRegistry::new();
        let context = ExecutionContext::new(false);
        let a = Command::new();
        let b = Command::new();
        registry.attach(EventKind::Start, a.id(), a.downgrade(), None);
        registry.attach(EventKind::End, b.id(), b.downgrade(), None);

        registry.forward_all(&context);
        assert!(registry.entries().iter().all(EventCommand::is_forwarded));
        assert_eq!(context.observer_count(), 2);

        registry.unforward_all(&context);
        assert!(registry.entries().iter().all(|e| !e.is_forwarded()));
        assert_eq!(context.observer_count(), 0);
    }

    #[test]
    fn test_duplicates_detach_together() {
        let mut registry = EventObserverRegistry::new();
        let context = ExecutionContext::new(false);
        let command = Command::new();
        let other = Command::new();
        registry.attach(EventKind::Start, command.id(), command.downgrade(), Some(&context));
        registry.attach(EventKind::Start, command.id(), command.downgrade(), Some(&context));
        registry.attach(EventKind::Start, other.id(), other.downgrade(), Some(&context));
        assert_eq!(context.observer_count(), 3);

        assert_eq!(registry.detach_all(command.id(), Some(&context)), 2);
        assert_eq!(context.observer_count(), 1);
        assert!(!registry.contains(command.id()));
        assert!(registry.contains(other.id()));

        // a second detach finds nothing and touches nothing
        assert_eq!(registry.detach_all(command.id(), Some(&context)), 0);
        assert_eq!(context.observer_count(), 1);
    }

    #[test]
    fn test_clear_returns_live_commands_once() {
        let mut registry = EventObserverRegistry::new();
        let a = Command::new();
        let b = Command::new();
        registry.attach(EventKind::Start, a.id(), a.downgrade(), None);
        registry.attach(EventKind::End, a.id(), a.downgrade(), None);
        registry.attach(EventKind::End, b.id(), b.downgrade(), None);

        let alive = registry.clear(None);
        assert_eq!(alive.len(), 2);
        assert!(registry.is_empty());
    }
}
