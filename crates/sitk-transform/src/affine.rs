use std::ops;

use crate::error::TransformError;
use crate::kind::TransformKind;
use crate::transform::Transform;

/// A linear map plus translation about a center.
///
/// The parameters are the row-major matrix followed by the translation; the
/// fixed parameters are the center. A point maps to `M (p - c) + c + t`.
///
/// The `scale`, `shear`, `translate` and `rotate` operations apply a new map
/// after the current one. The center is kept and the translation adjusted.
#[derive(Clone, Debug, PartialEq)]
pub struct AffineTransform(Transform);

impl AffineTransform {
    /// Creates the identity in `dimension`.
    ///
    /// # Errors
    ///
    /// [`TransformError::UnsupportedConfiguration`] unless `dimension` is 2 or 3.
    pub fn new(dimension: usize) -> Result<Self, TransformError> {
        Ok(Self(Transform::new(dimension, TransformKind::Affine)?))
    }

    /// The row-major linear part.
    pub fn matrix(&self) -> &[f64] {
        let d = self.0.dimension();
        &self.0.parameters()[..d * d]
    }

    /// Sets the row-major linear part.
    pub fn set_matrix(&mut self, matrix: &[f64]) -> Result<&mut Self, TransformError> {
        let d = self.0.dimension();
        check_len("matrix", d * d, matrix.len())?;
        self.0.store_mut().parameters_mut()[..d * d].copy_from_slice(matrix);
        Ok(self)
    }

    /// The translation.
    pub fn translation(&self) -> &[f64] {
        let d = self.0.dimension();
        &self.0.parameters()[d * d..]
    }

    /// Sets the translation.
    pub fn set_translation(&mut self, translation: &[f64]) -> Result<&mut Self, TransformError> {
        let d = self.0.dimension();
        check_len("translation", d, translation.len())?;
        self.0.store_mut().parameters_mut()[d * d..].copy_from_slice(translation);
        Ok(self)
    }

    /// The center of rotation.
    pub fn center(&self) -> &[f64] {
        self.0.fixed_parameters()
    }

    /// Sets the center of rotation, leaving matrix and translation unchanged.
    pub fn set_center(&mut self, center: &[f64]) -> Result<&mut Self, TransformError> {
        self.0.set_fixed_parameters(center)?;
        Ok(self)
    }

    /// Scales each axis by the matching factor.
    pub fn scale(&mut self, factors: &[f64]) -> Result<&mut Self, TransformError> {
        let d = self.0.dimension();
        check_len("scale factors", d, factors.len())?;
        let mut trans = identity(d);
        for (i, f) in factors.iter().enumerate() {
            trans[i * d + i] = *f;
        }
        self.compose(&trans, None);
        Ok(self)
    }

    /// Scales every axis by `factor`.
    pub fn scale_uniform(&mut self, factor: f64) -> &mut Self {
        let d = self.0.dimension();
        let mut trans = identity(d);
        for i in 0..d {
            trans[i * d + i] = factor;
        }
        self.compose(&trans, None);
        self
    }

    /// Shears `axis1` in proportion to `axis2`.
    pub fn shear(
        &mut self,
        axis1: usize,
        axis2: usize,
        coefficient: f64,
    ) -> Result<&mut Self, TransformError> {
        let d = self.0.dimension();
        check_axes(d, axis1, axis2)?;
        let mut trans = identity(d);
        trans[axis1 * d + axis2] = coefficient;
        self.compose(&trans, None);
        Ok(self)
    }

    /// Adds `offset` after the current map.
    pub fn translate(&mut self, offset: &[f64]) -> Result<&mut Self, TransformError> {
        let d = self.0.dimension();
        check_len("offset", d, offset.len())?;
        self.compose(&identity(d), Some(offset));
        Ok(self)
    }

    /// Rotates by `angle` radians in the plane of `axis1` and `axis2`.
    pub fn rotate(
        &mut self,
        axis1: usize,
        axis2: usize,
        angle: f64,
    ) -> Result<&mut Self, TransformError> {
        let d = self.0.dimension();
        check_axes(d, axis1, axis2)?;
        let (s, c) = angle.sin_cos();
        let mut trans = identity(d);
        trans[axis1 * d + axis1] = c;
        trans[axis1 * d + axis2] = s;
        trans[axis2 * d + axis1] = -s;
        trans[axis2 * d + axis2] = c;
        self.compose(&trans, None);
        Ok(self)
    }

    /// Applies `trans` and then `offset` after the current map.
    fn compose(&mut self, trans: &[f64], offset: Option<&[f64]>) {
        let d = self.0.dimension();
        let center = self.center().to_vec();
        let matrix = self.matrix().to_vec();
        let translation = self.translation().to_vec();

        // offset of the map written as `M p + o`
        let mut affine_offset: Vec<f64> = (0..d)
            .map(|i| translation[i] + center[i] - dot(&matrix[i * d..(i + 1) * d], &center))
            .collect();

        let matrix: Vec<f64> = (0..d * d)
            .map(|k| {
                let (i, j) = (k / d, k % d);
                (0..d).map(|m| trans[i * d + m] * matrix[m * d + j]).sum()
            })
            .collect();
        affine_offset = (0..d)
            .map(|i| dot(&trans[i * d..(i + 1) * d], &affine_offset))
            .collect();
        if let Some(offset) = offset {
            for (o, delta) in affine_offset.iter_mut().zip(offset) {
                *o += delta;
            }
        }

        let params = self.0.store_mut().parameters_mut();
        params[..d * d].copy_from_slice(&matrix);
        for i in 0..d {
            params[d * d + i] =
                affine_offset[i] - center[i] + dot(&matrix[i * d..(i + 1) * d], &center);
        }
    }

    /// Replaces the parameter vector.
    pub fn set_parameters(&mut self, values: &[f64]) -> Result<(), TransformError> {
        self.0.set_parameters(values)
    }

    /// Replaces the fixed parameter vector, which is the center.
    pub fn set_fixed_parameters(&mut self, values: &[f64]) -> Result<(), TransformError> {
        self.0.set_fixed_parameters(values)
    }
}

fn identity(d: usize) -> Vec<f64> {
    let mut m = vec![0.0; d * d];
    for i in 0..d {
        m[i * d + i] = 1.0;
    }
    m
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<(), TransformError> {
    if expected != actual {
        return Err(TransformError::ShapeMismatch {
            name,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_axes(d: usize, axis1: usize, axis2: usize) -> Result<(), TransformError> {
    if axis1 >= d || axis2 >= d || axis1 == axis2 {
        return Err(TransformError::UnsupportedConfiguration(format!(
            "axes ({axis1}, {axis2}) do not span a plane in {d}-D"
        )));
    }
    Ok(())
}

impl ops::Deref for AffineTransform {
    type Target = Transform;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<AffineTransform> for Transform {
    fn from(tx: AffineTransform) -> Self {
        tx.0
    }
}

impl TryFrom<Transform> for AffineTransform {
    type Error = TransformError;

    fn try_from(tx: Transform) -> Result<Self, Self::Error> {
        if tx.kind() != TransformKind::Affine {
            return Err(TransformError::UnsupportedConfiguration(format!(
                "expected an AffineTransform, got {}",
                tx.kind()
            )));
        }
        Ok(Self(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compose_with_center() -> Result<(), TransformError> {
        let mut tx = AffineTransform::new(2)?;
        tx.set_center(&[10.0, 10.0])?;
        tx.scale_uniform(3.0);
        assert_eq!(tx.center(), &[10.0, 10.0]);
        assert_eq!(tx.translation(), &[20.0, 20.0]);
        let y = tx.transform_point(&[10.0, 10.0])?;
        assert_relative_eq!(y[0], 30.0);
        assert_relative_eq!(y[1], 30.0);
        let y = tx.transform_point(&[11.0, 10.0])?;
        assert_relative_eq!(y[0], 33.0);
        assert_relative_eq!(y[1], 30.0);
        Ok(())
    }

    #[test]
    fn test_compose_after_translation() -> Result<(), TransformError> {
        let mut tx = AffineTransform::new(2)?;
        tx.translate(&[1.0, 0.0])?.scale(&[2.0, 2.0])?;
        // translate first, then scale the result
        let y = tx.transform_point(&[1.0, 1.0])?;
        assert_relative_eq!(y[0], 4.0);
        assert_relative_eq!(y[1], 2.0);
        assert_eq!(tx.translation(), &[2.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_bad_axes() -> Result<(), TransformError> {
        let mut tx = AffineTransform::new(2)?;
        assert!(tx.shear(0, 2, 1.0).is_err());
        assert!(tx.rotate(1, 1, 1.0).is_err());
        assert_eq!(tx.matrix(), &[1.0, 0.0, 0.0, 1.0]);
        Ok(())
    }
}
