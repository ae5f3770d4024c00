/// An error type for the process module.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// An active measurement was requested while no execution is running.
    #[error("No active execution context")]
    NoActiveExecution,

    /// The process was used in a way its lifecycle does not allow.
    #[error("Lifecycle violation: {0}")]
    LifecycleViolation(String),
}
