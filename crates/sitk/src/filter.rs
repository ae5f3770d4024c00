use sitk_process::{Process, ProcessObject};
use sitk_transform::Transform;

use crate::error::FilterError;

/// Maps a list of physical points through a [`Transform`].
///
/// Each mapped point emits an iteration and a progress event. When the
/// filter is aborted the output holds the points mapped so far.
///
/// # Example
///
/// ```
/// use sitk::transform::{Transform, TransformKind};
/// use sitk::{FilterError, TransformPointsFilter};
///
/// let mut tx = Transform::new(2, TransformKind::Translation)?;
/// tx.set_parameters(&[1.0, 2.0])?;
///
/// let filter = TransformPointsFilter::new(tx);
/// let out = filter.execute(&[[0.0, 0.0], [1.0, 1.0]])?;
/// assert_eq!(out, vec![vec![1.0, 2.0], vec![2.0, 3.0]]);
/// # Ok::<(), FilterError>(())
/// ```
pub struct TransformPointsFilter {
    process: ProcessObject,
    transform: Transform,
}

impl TransformPointsFilter {
    /// Creates a filter mapping points through `transform`.
    pub fn new(transform: Transform) -> Self {
        Self {
            process: ProcessObject::new(),
            transform,
        }
    }

    /// The transform points are mapped through.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replaces the transform.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Maps every point, in order.
    ///
    /// # Errors
    ///
    /// [`FilterError::Transform`] if a point does not have the transform's
    /// dimension, [`FilterError::Process`] if the filter is already executing.
    pub fn execute<P: AsRef<[f64]>>(&self, points: &[P]) -> Result<Vec<Vec<f64>>, FilterError> {
        if self.debug() {
            log::debug!("{}: mapping {} points", self.name(), points.len());
        }
        self.process.execute(|ctx| -> Result<Vec<Vec<f64>>, FilterError> {
            let total = points.len();
            let mut output = Vec::with_capacity(total);
            for (i, point) in points.iter().enumerate() {
                if ctx.abort_requested() {
                    log::debug!("{}: aborted after {i} of {total} points", self.name());
                    break;
                }
                output.push(self.transform.transform_point(point.as_ref())?);
                ctx.iteration();
                ctx.update_progress((i + 1) as f32 / total as f32);
            }
            Ok(output)
        })
    }
}

impl Process for TransformPointsFilter {
    fn name(&self) -> &str {
        "TransformPointsFilter"
    }

    fn process_object(&self) -> &ProcessObject {
        &self.process
    }
}

impl std::fmt::Display for TransformPointsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.name())?;
        writeln!(f, "  Debug: {}", self.debug())?;
        writeln!(f, "  NumberOfThreads: {}", self.number_of_threads())?;
        write!(f, "  Transform: {}", self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitk_transform::TransformKind;

    #[test]
    fn test_empty_input() -> Result<(), FilterError> {
        let filter = TransformPointsFilter::new(Transform::new(3, TransformKind::Identity)?);
        let out = filter.execute::<[f64; 3]>(&[])?;
        assert!(out.is_empty());
        assert_eq!(filter.progress(), 1.0);
        Ok(())
    }

    #[test]
    fn test_display() -> Result<(), FilterError> {
        let filter = TransformPointsFilter::new(Transform::new(2, TransformKind::Scale)?);
        let text = filter.to_string();
        assert!(text.starts_with("TransformPointsFilter\n"));
        assert!(text.contains("Transform: ScaleTransform (2-D)"));
        Ok(())
    }
}
