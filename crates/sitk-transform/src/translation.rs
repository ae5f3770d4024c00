use std::ops;

use crate::error::TransformError;
use crate::kind::TransformKind;
use crate::transform::Transform;

/// A transform that adds a constant offset to every point.
///
/// Dereferences to the underlying [`Transform`] for read access.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslationTransform(Transform);

impl TranslationTransform {
    /// Creates a zero translation in `dimension`.
    pub fn new(dimension: usize) -> Result<Self, TransformError> {
        Ok(Self(Transform::new(dimension, TransformKind::Translation)?))
    }

    /// Creates a translation by `offset` in `dimension`.
    ///
    /// # Errors
    ///
    /// [`TransformError::ShapeMismatch`] if `offset` does not have `dimension`
    /// entries.
    pub fn with_offset(dimension: usize, offset: &[f64]) -> Result<Self, TransformError> {
        let mut tx = Self::new(dimension)?;
        tx.set_offset(offset)?;
        Ok(tx)
    }

    /// The offset added to every point.
    pub fn offset(&self) -> &[f64] {
        self.0.parameters()
    }

    /// Sets the offset.
    pub fn set_offset(&mut self, offset: &[f64]) -> Result<&mut Self, TransformError> {
        self.0.set_parameters(offset)?;
        Ok(self)
    }

    /// Replaces the parameter vector, which is the offset.
    pub fn set_parameters(&mut self, values: &[f64]) -> Result<(), TransformError> {
        self.0.set_parameters(values)
    }

    /// Replaces the fixed parameter vector, which is always empty.
    pub fn set_fixed_parameters(&mut self, values: &[f64]) -> Result<(), TransformError> {
        self.0.set_fixed_parameters(values)
    }
}

impl ops::Deref for TranslationTransform {
    type Target = Transform;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<TranslationTransform> for Transform {
    fn from(tx: TranslationTransform) -> Self {
        tx.0
    }
}

impl TryFrom<Transform> for TranslationTransform {
    type Error = TransformError;

    fn try_from(tx: Transform) -> Result<Self, Self::Error> {
        if tx.kind() != TransformKind::Translation {
            return Err(TransformError::UnsupportedConfiguration(format!(
                "expected a TranslationTransform, got {}",
                tx.kind()
            )));
        }
        Ok(Self(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_points() -> Result<(), TransformError> {
        let tx = TranslationTransform::with_offset(2, &[1.0, -1.0])?;
        assert_eq!(tx.transform_point(&[0.5, 0.5])?, vec![1.5, -0.5]);
        Ok(())
    }

    #[test]
    fn test_try_from() -> Result<(), TransformError> {
        let generic = Transform::new(3, TransformKind::Translation)?;
        let tx = TranslationTransform::try_from(generic)?;
        assert_eq!(tx.dimension(), 3);
        assert!(TranslationTransform::try_from(Transform::new(3, TransformKind::Affine)?).is_err());
        Ok(())
    }
}
