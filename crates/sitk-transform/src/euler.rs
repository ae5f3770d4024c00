use std::ops;

use crate::error::TransformError;
use crate::kind::{ParameterLayout, TransformKind};
use crate::parameters::TransformParameterStore;
use crate::transform::Transform;

/// A 3-D rotation by Euler angles about a center, plus a translation.
///
/// The parameters are the angles about x, y and z followed by the
/// translation; the fixed parameters are the center. The rotation is applied
/// as `Rz Rx Ry`, or `Rz Ry Rx` when [`Euler3DTransform::compute_zyx`] is set.
#[derive(Clone, Debug, PartialEq)]
pub struct Euler3DTransform(Transform);

impl Euler3DTransform {
    /// Creates the identity rotation about the origin.
    pub fn new() -> Self {
        let layout = ParameterLayout {
            parameters: 6,
            fixed: 3,
        };
        Self(Transform::from_store(
            3,
            TransformKind::Euler,
            TransformParameterStore::new(layout),
        ))
    }

    /// Creates the identity rotation about `center`.
    pub fn with_center(center: &[f64]) -> Result<Self, TransformError> {
        let mut tx = Self::new();
        tx.set_center(center)?;
        Ok(tx)
    }

    /// Creates a rotation by the given angles, in radians, about `center`.
    pub fn with_rotation(
        center: &[f64],
        angle_x: f64,
        angle_y: f64,
        angle_z: f64,
    ) -> Result<Self, TransformError> {
        let mut tx = Self::with_center(center)?;
        tx.set_rotation(angle_x, angle_y, angle_z);
        Ok(tx)
    }

    /// The center of rotation.
    pub fn center(&self) -> &[f64] {
        self.0.fixed_parameters()
    }

    /// Sets the center of rotation.
    pub fn set_center(&mut self, center: &[f64]) -> Result<&mut Self, TransformError> {
        self.0.set_fixed_parameters(center)?;
        Ok(self)
    }

    /// Rotation about the x axis in radians.
    pub fn angle_x(&self) -> f64 {
        self.0.parameters()[0]
    }

    /// Rotation about the y axis in radians.
    pub fn angle_y(&self) -> f64 {
        self.0.parameters()[1]
    }

    /// Rotation about the z axis in radians.
    pub fn angle_z(&self) -> f64 {
        self.0.parameters()[2]
    }

    /// Sets the three rotation angles in radians.
    pub fn set_rotation(&mut self, angle_x: f64, angle_y: f64, angle_z: f64) -> &mut Self {
        self.0.store_mut().parameters_mut()[..3].copy_from_slice(&[angle_x, angle_y, angle_z]);
        self
    }

    /// The translation.
    pub fn translation(&self) -> &[f64] {
        &self.0.parameters()[3..]
    }

    /// Sets the translation.
    pub fn set_translation(&mut self, translation: &[f64]) -> Result<&mut Self, TransformError> {
        if translation.len() != 3 {
            return Err(TransformError::ShapeMismatch {
                name: "translation",
                expected: 3,
                actual: translation.len(),
            });
        }
        self.0.store_mut().parameters_mut()[3..].copy_from_slice(translation);
        Ok(self)
    }

    /// Returns true if the rotation is applied in z, y, x order.
    pub fn compute_zyx(&self) -> bool {
        self.0.compute_zyx()
    }

    /// Selects the z, y, x rotation order.
    pub fn set_compute_zyx(&mut self, compute_zyx: bool) -> &mut Self {
        self.0.set_compute_zyx(compute_zyx);
        self
    }

    /// Same as `set_compute_zyx(true)`.
    pub fn compute_zyx_on(&mut self) -> &mut Self {
        self.set_compute_zyx(true)
    }

    /// Same as `set_compute_zyx(false)`.
    pub fn compute_zyx_off(&mut self) -> &mut Self {
        self.set_compute_zyx(false)
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

impl Default for Euler3DTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl ops::Deref for Euler3DTransform {
    type Target = Transform;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Euler3DTransform> for Transform {
    fn from(tx: Euler3DTransform) -> Self {
        tx.0
    }
}

impl TryFrom<Transform> for Euler3DTransform {
    type Error = TransformError;

    fn try_from(tx: Transform) -> Result<Self, Self::Error> {
        if tx.kind() != TransformKind::Euler || tx.dimension() != 3 {
            return Err(TransformError::UnsupportedConfiguration(format!(
                "expected a 3-D EulerTransform, got {} in {}-D",
                tx.kind(),
                tx.dimension()
            )));
        }
        Ok(Self(tx))
    }
}
