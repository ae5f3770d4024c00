use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::command::CommandInner;
use crate::event::EventKind;

/// An observer forwarded onto an execution context.
struct ForwardedObserver {
    tag: u64,
    event: EventKind,
    command: Weak<CommandInner>,
}

/// The transient worker of a process object.
///
/// A context exists only between the begin and the end of one execution. The
/// owning process forwards its registered commands onto it, so the commands
/// see the events the worker emits, and routes the active measurements
/// (progress, abort request) to it while it exists.
///
/// The context only ever holds weak references to commands.
pub struct ExecutionContext {
    observers: RefCell<Vec<ForwardedObserver>>,
    next_tag: Cell<u64>,
    progress: Cell<f32>,
    abort_requested: Cell<bool>,
    debug: bool,
}

impl ExecutionContext {
    pub(crate) fn new(debug: bool) -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
            next_tag: Cell::new(0),
            progress: Cell::new(0.0),
            abort_requested: Cell::new(false),
            debug,
        }
    }

    /// Registers `command` for `event` and returns the tag needed to remove it.
    pub(crate) fn add_observer(&self, event: EventKind, command: Weak<CommandInner>) -> u64 {
        let tag = self.next_tag.get();
        self.next_tag.set(tag + 1);
        self.observers.borrow_mut().push(ForwardedObserver {
            tag,
            event,
            command,
        });
        tag
    }

    /// Removes the observer registered under `tag`.
    ///
    /// Returns false if no such observer exists, which makes repeated removal
    /// of the same tag harmless.
    pub(crate) fn remove_observer(&self, tag: u64) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|o| o.tag != tag);
        observers.len() != before
    }

    /// Number of observers currently forwarded onto this context.
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Returns true if a forwarded observer would receive `event`.
    pub fn has_observer(&self, event: EventKind) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|o| o.event.matches(event) && o.command.strong_count() > 0)
    }

    /// Delivers `event` to every forwarded observer registered for it.
    ///
    /// Callbacks run synchronously, in registration order, on the calling
    /// thread. The observer list is not borrowed while callbacks run.
    pub fn invoke_event(&self, event: EventKind) {
        let receivers: Vec<Rc<CommandInner>> = self
            .observers
            .borrow()
            .iter()
            .filter(|o| o.event.matches(event))
            .filter_map(|o| o.command.upgrade())
            .collect();

        if self.debug {
            log::debug!("{event} delivered to {} command(s)", receivers.len());
        }

        for command in receivers {
            command.execute();
        }
    }

    /// Returns the progress of the execution, in [0, 1].
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress.get()
    }

    /// Sets the progress, clamped to [0, 1], and emits a progress event.
    pub fn update_progress(&self, progress: f32) {
        self.progress.set(progress.clamp(0.0, 1.0));
        self.invoke_event(EventKind::Progress);
    }

    /// Emits an iteration event.
    pub fn iteration(&self) {
        self.invoke_event(EventKind::Iteration);
    }

    /// Requests the worker to stop at its next opportunity.
    pub fn request_abort(&self) {
        self.abort_requested.set(true);
    }

    /// Returns true once an abort was requested.
    ///
    /// Workers poll this between units of work.
    #[inline]
    pub fn abort_requested(&self) -> bool {
        self.abort_requested.get()
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("observers", &self.observer_count())
            .field("progress", &self.progress.get())
            .field("abort_requested", &self.abort_requested.get())
            .finish()
    }
}
