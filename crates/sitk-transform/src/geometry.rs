use crate::error::TransformError;
use crate::kind::{check_dimension, ParameterLayout};

/// The sampling grid of an image in physical space.
///
/// The direction is a row-major `d x d` matrix whose columns are the
/// physical directions of the index axes. It is assumed orthonormal.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageGeometry {
    size: Vec<usize>,
    origin: Vec<f64>,
    spacing: Vec<f64>,
    direction: Vec<f64>,
}

impl ImageGeometry {
    /// Creates a grid of `size` points with zero origin, unit spacing and
    /// identity direction.
    ///
    /// # Errors
    ///
    /// Fails unless the grid is 2-D or 3-D and small enough to carry one
    /// vector per point.
    pub fn new(size: &[usize]) -> Result<Self, TransformError> {
        let d = size.len();
        check_dimension(d)?;
        ParameterLayout::dense(size)?;
        let mut direction = vec![0.0; d * d];
        for i in 0..d {
            direction[i * d + i] = 1.0;
        }
        Ok(Self {
            size: size.to_vec(),
            origin: vec![0.0; d],
            spacing: vec![1.0; d],
            direction,
        })
    }

    /// Sets the physical position of the first grid point.
    pub fn with_origin(mut self, origin: &[f64]) -> Result<Self, TransformError> {
        check_len("origin", self.dimension(), origin.len())?;
        self.origin = origin.to_vec();
        Ok(self)
    }

    /// Sets the physical distance between grid points along each axis.
    pub fn with_spacing(mut self, spacing: &[f64]) -> Result<Self, TransformError> {
        check_len("spacing", self.dimension(), spacing.len())?;
        self.spacing = spacing.to_vec();
        Ok(self)
    }

    /// Sets the row-major direction matrix.
    pub fn with_direction(mut self, direction: &[f64]) -> Result<Self, TransformError> {
        let d = self.dimension();
        check_len("direction", d * d, direction.len())?;
        self.direction = direction.to_vec();
        Ok(self)
    }

    /// Number of axes of the grid.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    /// Number of points along each axis.
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    /// Physical position of the first grid point.
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    /// Distance between grid points along each axis.
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// Row-major direction matrix.
    pub fn direction(&self) -> &[f64] {
        &self.direction
    }

    /// Total number of grid points.
    pub fn num_points(&self) -> usize {
        self.size.iter().product()
    }

    /// Encodes the grid as fixed parameters: size, origin, spacing, direction.
    pub fn to_fixed_parameters(&self) -> Vec<f64> {
        let d = self.dimension();
        let mut fixed = Vec::with_capacity(d * (3 + d));
        fixed.extend(self.size.iter().map(|&s| s as f64));
        fixed.extend_from_slice(&self.origin);
        fixed.extend_from_slice(&self.spacing);
        fixed.extend_from_slice(&self.direction);
        fixed
    }

    /// Decodes a grid from fixed parameters written by
    /// [`ImageGeometry::to_fixed_parameters`].
    pub fn from_fixed_parameters(dimension: usize, fixed: &[f64]) -> Result<Self, TransformError> {
        check_dimension(dimension)?;
        let d = dimension;
        check_len("fixed parameters", d * (3 + d), fixed.len())?;
        let (size, rest) = fixed.split_at(d);
        let (origin, rest) = rest.split_at(d);
        let (spacing, direction) = rest.split_at(d);
        let size = size
            .iter()
            .map(|&s| {
                if s >= 0.0 && s.fract() == 0.0 && s < usize::MAX as f64 {
                    Ok(s as usize)
                } else {
                    Err(TransformError::UnsupportedConfiguration(format!(
                        "grid size must be a non-negative integer, got {s}"
                    )))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&size)?
            .with_origin(origin)?
            .with_spacing(spacing)?
            .with_direction(direction)
    }

    /// Maps a physical point to continuous grid coordinates.
    pub fn physical_to_continuous_index(&self, point: &[f64]) -> Vec<f64> {
        let d = self.dimension();
        (0..d)
            .map(|i| {
                let projected: f64 = (0..d)
                    .map(|j| self.direction[j * d + i] * (point[j] - self.origin[j]))
                    .sum();
                projected / self.spacing[i]
            })
            .collect()
    }

    /// Offset of the grid point `index` in a buffer with the first axis fastest.
    pub(crate) fn flat_index(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(&self.size)
            .rev()
            .fold(0, |acc, (&i, &n)| acc * n + i)
    }
}

/// A dense field of displacement vectors sampled on an image grid.
///
/// The vectors are interleaved: the components of grid point `k` are at
/// `data[k * components..(k + 1) * components]`.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplacementField {
    geometry: ImageGeometry,
    components: usize,
    data: Vec<f64>,
}

impl DisplacementField {
    /// Creates a field from an interleaved buffer.
    pub fn new(
        geometry: ImageGeometry,
        components: usize,
        data: Vec<f64>,
    ) -> Result<Self, TransformError> {
        let expected = geometry
            .num_points()
            .checked_mul(components)
            .ok_or_else(|| {
                TransformError::UnsupportedConfiguration(format!(
                    "{components} components per point overflow the field size"
                ))
            })?;
        check_len("displacement data", expected, data.len())?;
        Ok(Self {
            geometry,
            components,
            data,
        })
    }

    /// Creates a field of zero vectors with one component per axis.
    pub fn zeros(geometry: ImageGeometry) -> Self {
        let components = geometry.dimension();
        let data = vec![0.0; geometry.num_points() * components];
        Self {
            geometry,
            components,
            data,
        }
    }

    /// The sampling grid.
    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    /// Number of components of each vector.
    pub fn components(&self) -> usize {
        self.components
    }

    /// The interleaved vectors.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn into_parts(self) -> (ImageGeometry, usize, Vec<f64>) {
        (self.geometry, self.components, self.data)
    }
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
