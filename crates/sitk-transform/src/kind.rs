use crate::error::TransformError;

/// The kinds of transform that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TransformKind {
    /// Maps every point to itself.
    #[default]
    Identity,
    /// Adds an offset.
    Translation,
    /// Scales each axis.
    Scale,
    /// Scales each axis by the exponential of the parameters.
    ScaleLogarithmic,
    /// Rotation by Euler angles plus translation about a center.
    Euler,
    /// Rotation, isotropic scale and translation about a center.
    Similarity,
    /// Quaternion rotation plus translation, 3-D only.
    QuaternionRigid,
    /// Versor rotation, 3-D only.
    Versor,
    /// Versor rotation plus translation, 3-D only.
    VersorRigid,
    /// Matrix plus translation about a center.
    Affine,
    /// Ordered stack of transforms.
    Composite,
    /// Dense per-voxel displacement vectors.
    DisplacementField,
    /// Cubic B-spline free form deformation.
    BSpline,
}

impl TransformKind {
    /// Returns true for kinds whose parameters live on a sampling grid.
    #[inline]
    pub fn is_dense(self) -> bool {
        matches!(
            self,
            TransformKind::DisplacementField | TransformKind::BSpline
        )
    }
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransformKind::Identity => "IdentityTransform",
            TransformKind::Translation => "TranslationTransform",
            TransformKind::Scale => "ScaleTransform",
            TransformKind::ScaleLogarithmic => "ScaleLogarithmicTransform",
            TransformKind::Euler => "EulerTransform",
            TransformKind::Similarity => "SimilarityTransform",
            TransformKind::QuaternionRigid => "QuaternionRigidTransform",
            TransformKind::Versor => "VersorTransform",
            TransformKind::VersorRigid => "VersorRigidTransform",
            TransformKind::Affine => "AffineTransform",
            TransformKind::Composite => "CompositeTransform",
            TransformKind::DisplacementField => "DisplacementFieldTransform",
            TransformKind::BSpline => "BSplineTransform",
        };
        write!(f, "{name}")
    }
}

/// Lengths of the parameter and fixed-parameter vectors of a transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ParameterLayout {
    /// Length of the optimizable parameter vector.
    pub parameters: usize,
    /// Length of the fixed parameter vector.
    pub fixed: usize,
}

impl ParameterLayout {
    /// Layout of the parametric `kind` in `dimension`.
    ///
    /// Fails for dimensions other than 2 and 3, for the rotation kinds that
    /// only exist in 3-D, and for the dense kinds, whose layout depends on a
    /// sampling grid (see [`ParameterLayout::dense`]).
    pub fn for_kind(kind: TransformKind, dimension: usize) -> Result<Self, TransformError> {
        check_dimension(dimension)?;
        let d = dimension;
        let (parameters, fixed) = match (kind, d) {
            (TransformKind::Identity, _) => (0, 0),
            (TransformKind::Composite, _) => (0, 0),
            (TransformKind::Translation, _) => (d, 0),
            (TransformKind::Scale, _) => (d, 0),
            (TransformKind::ScaleLogarithmic, _) => (d, 0),
            (TransformKind::Euler, 2) => (3, 2),
            (TransformKind::Euler, _) => (6, 3),
            (TransformKind::Similarity, 2) => (4, 2),
            (TransformKind::Similarity, _) => (7, 3),
            (TransformKind::QuaternionRigid, 3) => (7, 3),
            (TransformKind::Versor, 3) => (3, 3),
            (TransformKind::VersorRigid, 3) => (6, 3),
            (TransformKind::Affine, _) => (d * d + d, d),
            (TransformKind::QuaternionRigid, _)
            | (TransformKind::Versor, _)
            | (TransformKind::VersorRigid, _) => {
                return Err(TransformError::UnsupportedConfiguration(format!(
                    "{kind} is only defined in 3-D, got {d}-D"
                )))
            }
            (TransformKind::DisplacementField, _) | (TransformKind::BSpline, _) => {
                return Err(TransformError::UnsupportedConfiguration(format!(
                    "{kind} requires a reference image grid"
                )))
            }
        };
        Ok(Self { parameters, fixed })
    }

    /// Layout of a dense transform over a grid of `grid_size` points.
    ///
    /// One vector per grid point; the fixed parameters hold the grid size,
    /// origin, spacing and direction matrix.
    ///
    /// # Errors
    ///
    /// [`TransformError::UnsupportedConfiguration`] if the parameter vector of
    /// the grid could not be allocated.
    pub fn dense(grid_size: &[usize]) -> Result<Self, TransformError> {
        let d = grid_size.len();
        let max_len = isize::MAX as usize / std::mem::size_of::<f64>();
        let parameters = grid_size
            .iter()
            .try_fold(d, |acc, &n| acc.checked_mul(n))
            .filter(|&len| len <= max_len)
            .ok_or_else(|| {
                TransformError::UnsupportedConfiguration(format!(
                    "grid of size {grid_size:?} is too large"
                ))
            })?;
        Ok(Self {
            parameters,
            fixed: d * (3 + d),
        })
    }
}

/// Fails unless `dimension` is 2 or 3.
pub(crate) fn check_dimension(dimension: usize) -> Result<(), TransformError> {
    match dimension {
        2 | 3 => Ok(()),
        d => Err(TransformError::UnsupportedConfiguration(format!(
            "transforms are defined in 2-D and 3-D, got {d}-D"
        ))),
    }
}

/// Parameters of the identity mapping of a parametric kind.
pub(crate) fn identity_parameters(kind: TransformKind, dimension: usize, len: usize) -> Vec<f64> {
    let mut params = vec![0.0; len];
    match kind {
        TransformKind::Scale => params.fill(1.0),
        TransformKind::Similarity if dimension == 2 => params[0] = 1.0,
        TransformKind::Similarity => params[6] = 1.0,
        TransformKind::QuaternionRigid => params[3] = 1.0,
        TransformKind::Affine => {
            for i in 0..dimension {
                params[i * dimension + i] = 1.0;
            }
        }
        _ => {}
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(kind: TransformKind, d: usize) -> (usize, usize) {
        let l = ParameterLayout::for_kind(kind, d).unwrap();
        (l.parameters, l.fixed)
    }

    #[test]
    fn test_layout_table() {
        assert_eq!(layout(TransformKind::Identity, 2), (0, 0));
        assert_eq!(layout(TransformKind::Translation, 3), (3, 0));
        assert_eq!(layout(TransformKind::Scale, 2), (2, 0));
        assert_eq!(layout(TransformKind::ScaleLogarithmic, 3), (3, 0));
        assert_eq!(layout(TransformKind::Euler, 2), (3, 2));
        assert_eq!(layout(TransformKind::Euler, 3), (6, 3));
        assert_eq!(layout(TransformKind::Similarity, 2), (4, 2));
        assert_eq!(layout(TransformKind::Similarity, 3), (7, 3));
        assert_eq!(layout(TransformKind::QuaternionRigid, 3), (7, 3));
        assert_eq!(layout(TransformKind::Versor, 3), (3, 3));
        assert_eq!(layout(TransformKind::VersorRigid, 3), (6, 3));
        assert_eq!(layout(TransformKind::Affine, 2), (6, 2));
        assert_eq!(layout(TransformKind::Affine, 3), (12, 3));
    }

    #[test]
    fn test_3d_only_kinds() {
        for kind in [
            TransformKind::QuaternionRigid,
            TransformKind::Versor,
            TransformKind::VersorRigid,
        ] {
            assert!(matches!(
                ParameterLayout::for_kind(kind, 2),
                Err(TransformError::UnsupportedConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_bad_dimension() {
        assert!(ParameterLayout::for_kind(TransformKind::Affine, 1).is_err());
        assert!(ParameterLayout::for_kind(TransformKind::Affine, 4).is_err());
    }

    #[test]
    fn test_dense_layout() -> Result<(), TransformError> {
        assert_eq!(
            ParameterLayout::dense(&[10, 10])?,
            ParameterLayout {
                parameters: 200,
                fixed: 10
            }
        );
        assert_eq!(
            ParameterLayout::dense(&[10, 10, 10])?,
            ParameterLayout {
                parameters: 3000,
                fixed: 18
            }
        );
        Ok(())
    }

    #[test]
    fn test_dense_layout_too_large() {
        assert!(matches!(
            ParameterLayout::dense(&[usize::MAX, 2]),
            Err(TransformError::UnsupportedConfiguration(_))
        ));
        assert!(matches!(
            ParameterLayout::dense(&[1 << 31, 1 << 31, 1 << 2]),
            Err(TransformError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_identity_parameters() {
        assert_eq!(
            identity_parameters(TransformKind::Affine, 2, 6),
            vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
        assert_eq!(
            identity_parameters(TransformKind::Similarity, 3, 7)[6],
            1.0
        );
        assert_eq!(identity_parameters(TransformKind::Scale, 3, 3), vec![1.0; 3]);
    }
}
