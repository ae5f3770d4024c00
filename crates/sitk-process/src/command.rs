use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::process::ProcessState;

/// Identity of a [`Command`].
///
/// Registries key their entries on this value, never on the event kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(u64);

impl CommandId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type Callback = Box<dyn FnMut()>;

/// Shared part of a command, reachable weakly from processes and execution contexts.
pub(crate) struct CommandInner {
    id: CommandId,
    name: RefCell<String>,
    callback: RefCell<Option<Callback>>,
    /// Back references to every process this command is registered with.
    processes: RefCell<Vec<Weak<ProcessState>>>,
}

impl CommandInner {
    /// Runs the callback.
    ///
    /// A callback that re-enters its own command is skipped instead of
    /// borrowing the closure twice.
    pub(crate) fn execute(&self) {
        match self.callback.try_borrow_mut() {
            Ok(mut callback) => {
                if let Some(callback) = callback.as_mut() {
                    callback();
                }
            }
            Err(_) => log::warn!(
                "command {} ({}) re-entered its own callback, skipping",
                self.id,
                self.name.borrow()
            ),
        }
    }

    /// Records `process` in the back-set, once.
    pub(crate) fn add_process(&self, process: Weak<ProcessState>) {
        let mut processes = self.processes.borrow_mut();
        if !processes.iter().any(|p| p.ptr_eq(&process)) {
            processes.push(process);
        }
    }

    /// Forgets `process`, along with any process that has gone away.
    pub(crate) fn remove_process(&self, process: &Weak<ProcessState>) {
        self.processes
            .borrow_mut()
            .retain(|p| !p.ptr_eq(process) && p.strong_count() > 0);
    }

    #[cfg(test)]
    pub(crate) fn process_links(&self) -> usize {
        self.processes.borrow().len()
    }
}

/// An observer of process events.
///
/// The command is owned by the client. Registering it with a process creates
/// a non-owning link in both directions: the process can reach the command
/// while both are alive, and whichever of the two is dropped first unlinks
/// itself from the other. Commands can therefore live on the stack next to
/// the processes they observe, in any order.
///
/// Commands are not clonable; their identity is what processes register.
///
/// # Example
///
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use sitk_process::{Command, EventKind, ProcessObject};
///
/// let process = ProcessObject::new();
/// let started = Rc::new(Cell::new(0));
/// let counter = started.clone();
/// let command = Command::from_fn(move || counter.set(counter.get() + 1));
///
/// process.add_command(EventKind::Start, &command);
/// process
///     .execute(|_ctx| Ok::<_, sitk_process::ProcessError>(()))
///     .unwrap();
/// assert_eq!(started.get(), 1);
///
/// drop(command);
/// assert!(!process.has_command(EventKind::Start));
/// ```
pub struct Command {
    inner: Rc<CommandInner>,
}

impl Command {
    /// Creates a command whose callback does nothing.
    pub fn new() -> Self {
        Self::with_callback(None)
    }

    /// Creates a command running `callback` on every event it receives.
    pub fn from_fn(callback: impl FnMut() + 'static) -> Self {
        Self::with_callback(Some(Box::new(callback)))
    }

    fn with_callback(callback: Option<Callback>) -> Self {
        Self {
            inner: Rc::new(CommandInner {
                id: CommandId::next(),
                name: RefCell::new("Command".to_string()),
                callback: RefCell::new(callback),
                processes: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Returns the identity of the command.
    #[inline]
    pub fn id(&self) -> CommandId {
        self.inner.id
    }

    /// Returns the user readable name of the command.
    pub fn name(&self) -> String {
        self.inner.name.borrow().clone()
    }

    /// Sets the user readable name of the command.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.inner.name.borrow_mut() = name.into();
    }

    /// Replaces the callback.
    pub fn set_callback(&self, callback: impl FnMut() + 'static) {
        *self.inner.callback.borrow_mut() = Some(Box::new(callback));
    }

    /// Runs the callback, as a process does when an event is delivered.
    pub fn execute(&self) {
        self.inner.execute();
    }

    /// Number of live processes this command is registered with.
    pub fn process_count(&self) -> usize {
        self.inner
            .processes
            .borrow()
            .iter()
            .filter(|p| p.strong_count() > 0)
            .count()
    }

    pub(crate) fn downgrade(&self) -> Weak<CommandInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn inner(&self) -> &CommandInner {
        &self.inner
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name.borrow())
            .field("processes", &self.process_count())
            .finish()
    }
}

impl Drop for Command {
    fn drop(&mut self) {
        // take the back-set first: detaching must not touch it again
        let processes = std::mem::take(&mut *self.inner.processes.borrow_mut());
        for process in processes.iter().filter_map(Weak::upgrade) {
            process.on_command_delete(self.inner.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_default_command_does_nothing() {
        let command = Command::new();
        command.execute();
        assert_eq!(command.name(), "Command");
        assert_eq!(command.process_count(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Command::new();
        let b = Command::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_callback() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let command = Command::from_fn(move || counter.set(counter.get() + 1));
        command.execute();
        command.execute();
        assert_eq!(calls.get(), 2);

        let counter = calls.clone();
        command.set_callback(move || counter.set(100));
        command.execute();
        assert_eq!(calls.get(), 100);
    }

    #[test]
    fn test_name() {
        let command = Command::new();
        command.set_name("progress printer");
        assert_eq!(command.name(), "progress printer");
    }
}
