/// An error type for the transform module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A parameter vector has the wrong length for the transform kind and dimension.
    #[error("{name} has length {actual}, expected {expected}")]
    ShapeMismatch {
        /// Which vector was rejected.
        name: &'static str,
        /// Length required by the transform.
        expected: usize,
        /// Length that was given.
        actual: usize,
    },

    /// The kind and dimension combination cannot be constructed.
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// A point or transform has a different dimension than the transform.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the transform.
        expected: usize,
        /// Dimension that was given.
        actual: usize,
    },
}
