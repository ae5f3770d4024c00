use sitk_process::ProcessError;
use sitk_transform::TransformError;

/// An error type for executable operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The execution lifecycle was violated.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A transform rejected its input.
    #[error(transparent)]
    Transform(#[from] TransformError),
}
