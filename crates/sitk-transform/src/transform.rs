use crate::cow::CowValue;
use crate::error::TransformError;
use crate::geometry::{DisplacementField, ImageGeometry};
use crate::kind::{check_dimension, ParameterLayout, TransformKind};
use crate::ops;
use crate::parameters::TransformParameterStore;

/// A geometric transform with value semantics.
///
/// Cloning is cheap: the parameter vectors and composite components are
/// shared until one of the copies is modified.
///
/// # Example
///
/// ```
/// use sitk_transform::{Transform, TransformError, TransformKind};
///
/// let a = Transform::new(2, TransformKind::Translation)?;
/// let mut b = a.clone();
/// b.set_parameters(&[1.0, -1.0])?;
///
/// assert_eq!(a.transform_point(&[1.0, 1.0])?, vec![1.0, 1.0]);
/// assert_eq!(b.transform_point(&[1.0, 1.0])?, vec![2.0, 0.0]);
/// # Ok::<(), TransformError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    dimension: usize,
    kind: TransformKind,
    store: TransformParameterStore,
    components: CowValue<Vec<Transform>>,
    compute_zyx: bool,
}

impl Transform {
    /// Creates the identity mapping of a parametric `kind` in `dimension`.
    ///
    /// # Errors
    ///
    /// [`TransformError::UnsupportedConfiguration`] for dimensions other than 2
    /// and 3, for the 3-D only rotation kinds in 2-D, and for the dense kinds,
    /// which need a reference grid (see [`Transform::from_displacement_field`]
    /// and [`Transform::bspline`]).
    pub fn new(dimension: usize, kind: TransformKind) -> Result<Self, TransformError> {
        let store = TransformParameterStore::for_kind(kind, dimension)?;
        Ok(Self::from_store(dimension, kind, store))
    }

    pub(crate) fn from_store(
        dimension: usize,
        kind: TransformKind,
        store: TransformParameterStore,
    ) -> Self {
        Self {
            dimension,
            kind,
            store,
            components: CowValue::default(),
            compute_zyx: false,
        }
    }

    /// Creates a displacement field transform that takes over `field`.
    ///
    /// # Errors
    ///
    /// Fails unless the field has one component per axis of a 2-D or 3-D grid.
    pub fn from_displacement_field(field: DisplacementField) -> Result<Self, TransformError> {
        let (geometry, components, data) = field.into_parts();
        let dimension = geometry.dimension();
        check_dimension(dimension)?;
        if components != dimension {
            return Err(TransformError::UnsupportedConfiguration(format!(
                "a {dimension}-D displacement field needs {dimension} components, got {components}"
            )));
        }
        let layout = ParameterLayout::dense(geometry.size())?;
        let store =
            TransformParameterStore::with_values(layout, data, geometry.to_fixed_parameters())?;
        Ok(Self::from_store(
            dimension,
            TransformKind::DisplacementField,
            store,
        ))
    }

    /// Creates a zero cubic B-spline over the physical domain of `reference`
    /// with a single mesh element per axis.
    pub fn bspline(reference: &ImageGeometry) -> Result<Self, TransformError> {
        Self::bspline_with_mesh(reference, &vec![1; reference.dimension()])
    }

    /// Creates a zero cubic B-spline over the physical domain of `reference`.
    ///
    /// `mesh` holds the number of polynomial patches per axis; the control
    /// grid has `mesh + 3` points per axis and extends one grid spacing
    /// before the first image point.
    pub fn bspline_with_mesh(
        reference: &ImageGeometry,
        mesh: &[usize],
    ) -> Result<Self, TransformError> {
        let d = reference.dimension();
        check_dimension(d)?;
        if mesh.len() != d {
            return Err(TransformError::ShapeMismatch {
                name: "mesh size",
                expected: d,
                actual: mesh.len(),
            });
        }
        if mesh.contains(&0) || reference.size().iter().any(|&n| n < 2) {
            return Err(TransformError::UnsupportedConfiguration(format!(
                "cannot fit a mesh of {mesh:?} to an image of size {:?}",
                reference.size()
            )));
        }

        let grid_spacing: Vec<f64> = (0..d)
            .map(|i| {
                let extent = reference.spacing()[i] * (reference.size()[i] - 1) as f64;
                extent / mesh[i] as f64
            })
            .collect();
        let direction = reference.direction();
        let grid_origin: Vec<f64> = (0..d)
            .map(|j| {
                let shift: f64 = (0..d).map(|i| direction[j * d + i] * grid_spacing[i]).sum();
                reference.origin()[j] - shift
            })
            .collect();
        let grid_size: Vec<usize> = mesh.iter().map(|m| m.saturating_add(3)).collect();

        let grid = ImageGeometry::new(&grid_size)?
            .with_origin(&grid_origin)?
            .with_spacing(&grid_spacing)?
            .with_direction(direction)?;
        let layout = ParameterLayout::dense(&grid_size)?;
        let store = TransformParameterStore::with_values(
            layout,
            vec![0.0; layout.parameters],
            grid.to_fixed_parameters(),
        )?;
        Ok(Self::from_store(d, TransformKind::BSpline, store))
    }

    /// Number of spatial dimensions.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The kind of the transform.
    #[inline]
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// The component transforms of a composite, in the order they were added.
    /// Empty for any other kind.
    pub fn components(&self) -> &[Transform] {
        self.components.read()
    }

    /// The parameter vector. For a composite, the one of the last component.
    pub fn parameters(&self) -> &[f64] {
        match self.active_component() {
            Some(last) => last.parameters(),
            None => self.store.parameters(),
        }
    }

    /// The fixed parameter vector. For a composite, the one of the last component.
    pub fn fixed_parameters(&self) -> &[f64] {
        match self.active_component() {
            Some(last) => last.fixed_parameters(),
            None => self.store.fixed_parameters(),
        }
    }

    /// Replaces the parameter vector.
    ///
    /// # Errors
    ///
    /// [`TransformError::ShapeMismatch`] if `values` has the wrong length; the
    /// transform is then left unchanged.
    pub fn set_parameters(&mut self, values: &[f64]) -> Result<(), TransformError> {
        self.check_parameters(values)?;
        if self.active_component().is_some() {
            if let Some(last) = self.components.modify().last_mut() {
                return last.set_parameters(values);
            }
        }
        self.store.set_parameters(values)
    }

    fn check_parameters(&self, values: &[f64]) -> Result<(), TransformError> {
        match self.active_component() {
            Some(last) => last.check_parameters(values),
            None => self.store.check_parameters(values),
        }
    }

    /// Replaces the fixed parameter vector.
    ///
    /// For dense kinds the fixed parameters describe the sampling grid; a
    /// grid with a different number of points resets the parameters to zero.
    pub fn set_fixed_parameters(&mut self, values: &[f64]) -> Result<(), TransformError> {
        match self.kind {
            TransformKind::Composite if !self.components.read().is_empty() => {
                match self.components.modify().last_mut() {
                    Some(last) => last.set_fixed_parameters(values),
                    None => Ok(()),
                }
            }
            kind if kind.is_dense() => {
                let grid = ImageGeometry::from_fixed_parameters(self.dimension, values)?;
                let layout = ParameterLayout::dense(grid.size())?;
                if layout == self.store.layout() {
                    return self.store.set_fixed_parameters(values);
                }
                log::debug!(
                    "{}: grid resized to {:?}, parameters reset",
                    self.kind,
                    grid.size()
                );
                self.store
                    .relayout(layout, vec![0.0; layout.parameters], values);
                Ok(())
            }
            _ => self.store.set_fixed_parameters(values),
        }
    }

    /// The parameter store of a non-composite transform.
    pub fn parameter_store(&self) -> &TransformParameterStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut TransformParameterStore {
        &mut self.store
    }

    pub(crate) fn compute_zyx(&self) -> bool {
        self.compute_zyx
    }

    pub(crate) fn set_compute_zyx(&mut self, compute_zyx: bool) {
        self.compute_zyx = compute_zyx;
    }

    /// Returns true if both transforms share their parameter storage.
    pub fn shares_parameters_with(&self, other: &Self) -> bool {
        match (self.active_component(), other.active_component()) {
            (Some(a), Some(b)) => a.shares_parameters_with(b),
            (None, None) => self.store.shares_parameters_with(&other.store),
            _ => false,
        }
    }

    /// Appends `transform` to this composite.
    ///
    /// A transform of any other kind first becomes a composite holding
    /// itself. The composite applies the last added transform first.
    ///
    /// # Errors
    ///
    /// [`TransformError::DimensionMismatch`] if the dimensions differ.
    pub fn add_transform(&mut self, transform: Transform) -> Result<&mut Self, TransformError> {
        if transform.dimension != self.dimension {
            return Err(TransformError::DimensionMismatch {
                expected: self.dimension,
                actual: transform.dimension,
            });
        }
        if self.kind != TransformKind::Composite {
            let first = std::mem::take(self);
            *self = Self::from_store(
                first.dimension,
                TransformKind::Composite,
                TransformParameterStore::default(),
            );
            self.components.modify().push(first);
        }
        self.components.modify().push(transform);
        Ok(self)
    }

    /// Maps a physical point.
    ///
    /// # Errors
    ///
    /// [`TransformError::DimensionMismatch`] if `point` does not have the
    /// transform's dimension.
    pub fn transform_point(&self, point: &[f64]) -> Result<Vec<f64>, TransformError> {
        if point.len() != self.dimension {
            return Err(TransformError::DimensionMismatch {
                expected: self.dimension,
                actual: point.len(),
            });
        }
        if self.kind == TransformKind::Composite {
            return self
                .components
                .read()
                .iter()
                .rev()
                .try_fold(point.to_vec(), |p, t| t.transform_point(&p));
        }
        ops::map_point(
            self.kind,
            self.store.parameters(),
            self.store.fixed_parameters(),
            self.compute_zyx,
            point,
        )
    }

    fn active_component(&self) -> Option<&Transform> {
        match self.kind {
            TransformKind::Composite => self.components.read().last(),
            _ => None,
        }
    }
}

impl Default for Transform {
    /// The 3-D identity with empty parameter vectors.
    fn default() -> Self {
        Self::from_store(
            3,
            TransformKind::Identity,
            TransformParameterStore::default(),
        )
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_indented(f, 0)
    }
}

impl Transform {
    fn write_indented(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(f, "{pad}{} ({}-D)", self.kind, self.dimension)?;
        if self.kind == TransformKind::Composite {
            for component in self.components.read() {
                component.write_indented(f, depth + 1)?;
            }
            return Ok(());
        }
        write_values(f, &pad, "Parameters", self.store.parameters())?;
        write_values(f, &pad, "FixedParameters", self.store.fixed_parameters())?;
        if self.kind == TransformKind::Euler && self.dimension == 3 {
            writeln!(f, "{pad}  ComputeZYX: {}", self.compute_zyx)?;
        }
        Ok(())
    }
}

fn write_values(
    f: &mut std::fmt::Formatter<'_>,
    pad: &str,
    label: &str,
    values: &[f64],
) -> std::fmt::Result {
    const MAX_SHOWN: usize = 16;
    if values.len() > MAX_SHOWN {
        writeln!(f, "{pad}  {label}: [{} values]", values.len())
    } else {
        writeln!(f, "{pad}  {label}: {values:?}")
    }
}
