/// Events a process object emits while it executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Wildcard matching every other event.
    Any,
    /// The execution was aborted on request.
    Abort,
    /// The execution context is being torn down.
    Delete,
    /// The execution finished.
    End,
    /// One iteration of an iterative algorithm finished.
    Iteration,
    /// The progress measurement changed.
    Progress,
    /// The execution started.
    Start,
    /// Application defined event.
    User,
}

impl EventKind {
    /// All event kinds, the wildcard included.
    pub const ALL: [EventKind; 8] = [
        EventKind::Any,
        EventKind::Abort,
        EventKind::Delete,
        EventKind::End,
        EventKind::Iteration,
        EventKind::Progress,
        EventKind::Start,
        EventKind::User,
    ];

    /// Returns true if an observer registered for `self` receives `event`.
    #[inline]
    pub fn matches(self, event: EventKind) -> bool {
        self == EventKind::Any || self == event
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::Any => "AnyEvent",
            EventKind::Abort => "AbortEvent",
            EventKind::Delete => "DeleteEvent",
            EventKind::End => "EndEvent",
            EventKind::Iteration => "IterationEvent",
            EventKind::Progress => "ProgressEvent",
            EventKind::Start => "StartEvent",
            EventKind::User => "UserEvent",
        };
        write!(f, "{name}")
    }
}
