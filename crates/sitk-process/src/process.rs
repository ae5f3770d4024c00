use std::cell::{Cell, Ref, RefCell};
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::command::{Command, CommandId};
use crate::context::ExecutionContext;
use crate::error::ProcessError;
use crate::event::EventKind;
use crate::registry::EventObserverRegistry;
use crate::settings;

/// State shared weakly with the commands registered on a process.
pub(crate) struct ProcessState {
    registry: RefCell<EventObserverRegistry>,
    active: RefCell<Option<Rc<ExecutionContext>>>,
    // progress recorded when the last execution ended
    progress: Cell<f32>,
    debug: Cell<bool>,
    number_of_threads: Cell<u32>,
}

impl ProcessState {
    fn active(&self) -> Option<Rc<ExecutionContext>> {
        self.active.borrow().clone()
    }

    /// Removes every registration of a command that is being dropped.
    pub(crate) fn on_command_delete(&self, command_id: CommandId) {
        let context = self.active();
        self.registry
            .borrow_mut()
            .detach_all(command_id, context.as_deref());
    }
}

/// The observable state every executable operation owns.
///
/// A process object keeps the registry of the commands observing it and, only
/// while an execution is in progress, the [`ExecutionContext`] doing the work.
/// Registered commands are forwarded onto the context when the execution
/// begins and detached from it when the execution ends, so they see the events
/// of the real worker while their registration outlives it.
///
/// Process objects are single threaded: callbacks run on the thread that
/// executes the process, and the type is neither `Send` nor `Sync`.
///
/// # Example
///
/// ```
/// use sitk_process::{Command, EventKind, ProcessObject};
///
/// let process = ProcessObject::new();
/// let command = Command::new();
/// process.add_command(EventKind::Progress, &command);
///
/// {
///     let ctx = process.begin_execution().unwrap();
///     ctx.update_progress(0.5);
///     assert_eq!(process.progress(), 0.5);
/// }
///
/// assert!(!process.is_executing());
/// assert!(process.has_command(EventKind::Progress));
/// ```
pub struct ProcessObject {
    state: Rc<ProcessState>,
}

impl ProcessObject {
    /// Creates a process object with the process-wide defaults.
    pub fn new() -> Self {
        Self {
            state: Rc::new(ProcessState {
                registry: RefCell::new(EventObserverRegistry::new()),
                active: RefCell::new(None),
                progress: Cell::new(0.0),
                debug: Cell::new(settings::global_default_debug()),
                number_of_threads: Cell::new(settings::global_default_number_of_threads()),
            }),
        }
    }

    /// Registers `command` to be notified of `event`.
    ///
    /// The command is invoked during the execution of this process, on the
    /// thread running it. The registration is removed automatically when the
    /// command is dropped. Registering the same command twice for the same
    /// event yields two registrations.
    ///
    /// The return value is reserved and currently always zero.
    pub fn add_command(&self, event: EventKind, command: &Command) -> i32 {
        let context = self.state.active();
        let forwarded = self
            .state
            .registry
            .borrow_mut()
            .attach(event, command.id(), command.downgrade(), context.as_deref())
            .is_forwarded();
        command.inner().add_process(Rc::downgrade(&self.state));

        if self.debug() {
            log::debug!(
                "command {} registered for {event} (forwarded: {forwarded})",
                command.id()
            );
        }
        0
    }

    /// Removes every registration of `command` and unlinks the command from
    /// this process.
    ///
    /// Dropping a command does the same on every process it is registered with.
    pub fn detach_all(&self, command: &Command) {
        self.state.on_command_delete(command.id());
        command.inner().remove_process(&Rc::downgrade(&self.state));
    }

    /// Removes every registered command.
    ///
    /// Calling this from a callback this process is delivering is undefined
    /// behavior of the protocol.
    pub fn remove_all_commands(&self) {
        let context = self.state.active();
        let commands = self.state.registry.borrow_mut().clear(context.as_deref());
        let me = Rc::downgrade(&self.state);
        for command in commands {
            command.remove_process(&me);
        }
    }

    /// Returns true if a command is registered for `event` or for any event.
    pub fn has_command(&self, event: EventKind) -> bool {
        self.state.registry.borrow().has_command(event)
    }

    /// Borrows the registry, e.g. to inspect registration tags.
    pub fn registry(&self) -> Ref<'_, EventObserverRegistry> {
        self.state.registry.borrow()
    }

    /// Begins an execution.
    ///
    /// Creates the execution context, forwards every registered command onto
    /// it and makes it the active context. The execution ends when the
    /// returned guard is dropped, on every exit path.
    ///
    /// Fails with [`ProcessError::LifecycleViolation`] if an execution of this
    /// process is already in progress.
    pub fn begin_execution(&self) -> Result<ExecutionGuard<'_>, ProcessError> {
        if self.is_executing() {
            return Err(ProcessError::LifecycleViolation(
                "execution began while another execution is in progress".to_string(),
            ));
        }

        let context = Rc::new(ExecutionContext::new(self.debug()));
        *self.state.active.borrow_mut() = Some(Rc::clone(&context));

        // from here on the guard tears everything down, even on unwind
        let guard = ExecutionGuard {
            process: self,
            context,
        };
        self.state
            .registry
            .borrow_mut()
            .forward_all(&guard.context);

        if self.debug() {
            log::debug!(
                "execution began with {} forwarded command(s)",
                guard.context.observer_count()
            );
        }
        Ok(guard)
    }

    fn end_execution(&self) {
        let Some(context) = self.state.active() else {
            return;
        };

        context.invoke_event(EventKind::Delete);
        self.state.registry.borrow_mut().unforward_all(&context);

        let progress = if context.abort_requested() {
            1.0
        } else {
            context.progress()
        };
        self.state.progress.set(progress);
        *self.state.active.borrow_mut() = None;

        if self.debug() {
            log::debug!("execution ended with progress {progress}");
        }
    }

    /// Returns true while an execution is in progress.
    pub fn is_executing(&self) -> bool {
        self.state.active.borrow().is_some()
    }

    /// Returns the active execution context.
    pub fn active_context(&self) -> Result<Rc<ExecutionContext>, ProcessError> {
        self.state.active().ok_or(ProcessError::NoActiveExecution)
    }

    /// Active measurement of the execution progress, in [0, 1].
    ///
    /// While executing this reads the live context. Otherwise it is the
    /// progress recorded when the last execution ended, 1.0 if it was
    /// aborted, and 0.0 before the first execution.
    pub fn progress(&self) -> f32 {
        match self.active_context() {
            Ok(context) => context.progress(),
            Err(_) => self.state.progress.get(),
        }
    }

    /// Requests the active execution to abort.
    ///
    /// Further progress or iteration events may still be delivered before
    /// the worker stops. Without an active execution this has no effect.
    pub fn abort(&self) {
        match self.active_context() {
            Ok(context) => {
                if settings::global_warning_display() {
                    log::warn!("abort requested for the active execution");
                }
                context.request_abort();
            }
            Err(_) => {
                if self.debug() {
                    log::debug!("abort ignored, no active execution");
                }
            }
        }
    }

    /// Runs `work` inside a complete execution.
    ///
    /// Emits [`EventKind::Start`], runs the work, then sets the progress to
    /// 1.0 and emits [`EventKind::End`], or [`EventKind::Abort`] instead when
    /// an abort was requested. Errors of `work` end the execution early.
    pub fn execute<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&ExecutionContext) -> Result<T, E>,
        E: From<ProcessError>,
    {
        let ctx = self.begin_execution()?;
        ctx.invoke_event(EventKind::Start);

        let output = work(&*ctx)?;

        ctx.update_progress(1.0);
        if ctx.abort_requested() {
            ctx.invoke_event(EventKind::Abort);
        } else {
            ctx.invoke_event(EventKind::End);
        }
        Ok(output)
    }

    /// Returns the debug flag.
    pub fn debug(&self) -> bool {
        self.state.debug.get()
    }

    /// Enables or disables debug output of executions.
    pub fn set_debug(&self, flag: bool) {
        self.state.debug.set(flag);
    }

    /// Shorthand for `set_debug(true)`.
    pub fn debug_on(&self) {
        self.set_debug(true);
    }

    /// Shorthand for `set_debug(false)`.
    pub fn debug_off(&self) {
        self.set_debug(false);
    }

    /// Number of threads a multi-threaded operation uses.
    pub fn number_of_threads(&self) -> u32 {
        self.state.number_of_threads.get()
    }

    /// Sets the number of threads, clamped to at least one.
    pub fn set_number_of_threads(&self, n: u32) {
        self.state.number_of_threads.set(n.max(1));
    }
}

impl Default for ProcessObject {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessObject")
            .field("commands", &self.state.registry.borrow().len())
            .field("executing", &self.is_executing())
            .field("progress", &self.progress())
            .field("debug", &self.debug())
            .field("number_of_threads", &self.number_of_threads())
            .finish()
    }
}

impl Drop for ProcessObject {
    fn drop(&mut self) {
        self.end_execution();
        // unlink from every command still alive so none keeps a stale entry
        let me: Weak<ProcessState> = Rc::downgrade(&self.state);
        for command in self.state.registry.borrow_mut().clear(None) {
            command.remove_process(&me);
        }
    }
}

/// Scope of one execution of a process object.
///
/// Dereferences to the [`ExecutionContext`] the worker reports through.
/// Dropping the guard ends the execution: forwarded commands are detached, the
/// final progress is recorded and the context is discarded.
pub struct ExecutionGuard<'a> {
    process: &'a ProcessObject,
    context: Rc<ExecutionContext>,
}

impl Deref for ExecutionGuard<'_> {
    type Target = ExecutionContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        self.process.end_execution();
    }
}

/// The capability every executable operation implements.
///
/// Implementors own a [`ProcessObject`] and expose it; the observer and
/// measurement methods are provided.
pub trait Process: std::fmt::Display {
    /// User readable name of the operation.
    fn name(&self) -> &str;

    /// The observable state of the operation.
    fn process_object(&self) -> &ProcessObject;

    /// See [`ProcessObject::add_command`].
    fn add_command(&self, event: EventKind, command: &Command) -> i32 {
        self.process_object().add_command(event, command)
    }

    /// See [`ProcessObject::detach_all`].
    fn detach_all(&self, command: &Command) {
        self.process_object().detach_all(command)
    }

    /// See [`ProcessObject::has_command`].
    fn has_command(&self, event: EventKind) -> bool {
        self.process_object().has_command(event)
    }

    /// See [`ProcessObject::remove_all_commands`].
    fn remove_all_commands(&self) {
        self.process_object().remove_all_commands()
    }

    /// See [`ProcessObject::begin_execution`].
    fn begin_execution(&self) -> Result<ExecutionGuard<'_>, ProcessError> {
        self.process_object().begin_execution()
    }

    /// See [`ProcessObject::progress`].
    fn progress(&self) -> f32 {
        self.process_object().progress()
    }

    /// See [`ProcessObject::abort`].
    fn abort(&self) {
        self.process_object().abort()
    }

    /// See [`ProcessObject::debug`].
    fn debug(&self) -> bool {
        self.process_object().debug()
    }

    /// See [`ProcessObject::set_debug`].
    fn set_debug(&self, flag: bool) {
        self.process_object().set_debug(flag)
    }

    /// See [`ProcessObject::number_of_threads`].
    fn number_of_threads(&self) -> u32 {
        self.process_object().number_of_threads()
    }

    /// See [`ProcessObject::set_number_of_threads`].
    fn set_number_of_threads(&self, n: u32) {
        self.process_object().set_number_of_threads(n)
    }
}
