use crate::cow::CowValue;
use crate::error::TransformError;
use crate::kind::{identity_parameters, ParameterLayout, TransformKind};

/// The parameter and fixed-parameter vectors of a transform.
///
/// Both vectors are [`CowValue`]s: copies of a store share their vectors
/// until one of them writes, and the lengths always match the layout the
/// store was created with.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformParameterStore {
    layout: ParameterLayout,
    parameters: CowValue<Vec<f64>>,
    fixed_parameters: CowValue<Vec<f64>>,
}

impl TransformParameterStore {
    /// Creates a store of zeros for `layout`.
    pub fn new(layout: ParameterLayout) -> Self {
        Self {
            layout,
            parameters: CowValue::new(vec![0.0; layout.parameters]),
            fixed_parameters: CowValue::new(vec![0.0; layout.fixed]),
        }
    }

    /// Creates a store holding the identity parameters of `kind` in `dimension`.
    pub fn for_kind(kind: TransformKind, dimension: usize) -> Result<Self, TransformError> {
        let layout = ParameterLayout::for_kind(kind, dimension)?;
        Ok(Self {
            layout,
            parameters: CowValue::new(identity_parameters(kind, dimension, layout.parameters)),
            fixed_parameters: CowValue::new(vec![0.0; layout.fixed]),
        })
    }

    /// Creates a store from existing vectors, checking their lengths.
    pub fn with_values(
        layout: ParameterLayout,
        parameters: Vec<f64>,
        fixed_parameters: Vec<f64>,
    ) -> Result<Self, TransformError> {
        check_len("parameters", layout.parameters, parameters.len())?;
        check_len("fixed parameters", layout.fixed, fixed_parameters.len())?;
        Ok(Self {
            layout,
            parameters: CowValue::new(parameters),
            fixed_parameters: CowValue::new(fixed_parameters),
        })
    }

    /// The vector lengths of the store.
    #[inline]
    pub fn layout(&self) -> ParameterLayout {
        self.layout
    }

    /// The parameter vector.
    #[inline]
    pub fn parameters(&self) -> &[f64] {
        self.parameters.read()
    }

    /// The fixed parameter vector.
    #[inline]
    pub fn fixed_parameters(&self) -> &[f64] {
        self.fixed_parameters.read()
    }

    /// Checks that `values` fits the parameter vector.
    pub fn check_parameters(&self, values: &[f64]) -> Result<(), TransformError> {
        check_len("parameters", self.layout.parameters, values.len())
    }

    /// Checks that `values` fits the fixed parameter vector.
    pub fn check_fixed_parameters(&self, values: &[f64]) -> Result<(), TransformError> {
        check_len("fixed parameters", self.layout.fixed, values.len())
    }

    /// Replaces the parameter vector.
    ///
    /// On a length mismatch the store is left untouched. Copies of this store
    /// never observe the new values.
    pub fn set_parameters(&mut self, values: &[f64]) -> Result<(), TransformError> {
        self.check_parameters(values)?;
        assign(&mut self.parameters, values);
        Ok(())
    }

    /// Replaces the fixed parameter vector.
    ///
    /// On a length mismatch the store is left untouched.
    pub fn set_fixed_parameters(&mut self, values: &[f64]) -> Result<(), TransformError> {
        self.check_fixed_parameters(values)?;
        assign(&mut self.fixed_parameters, values);
        Ok(())
    }

    /// Mutable access to the parameter vector, detaching shared storage first.
    pub fn parameters_mut(&mut self) -> &mut [f64] {
        self.parameters.modify()
    }

    /// Mutable access to the fixed parameter vector, detaching shared storage first.
    pub fn fixed_parameters_mut(&mut self) -> &mut [f64] {
        self.fixed_parameters.modify()
    }

    /// Returns true if both stores share the parameter vector storage.
    pub fn shares_parameters_with(&self, other: &Self) -> bool {
        self.parameters.shares_storage(&other.parameters)
    }

    /// Returns true if both stores share the fixed parameter vector storage.
    pub fn shares_fixed_parameters_with(&self, other: &Self) -> bool {
        self.fixed_parameters.shares_storage(&other.fixed_parameters)
    }

    /// Replaces the layout and both vectors at once.
    pub(crate) fn relayout(
        &mut self,
        layout: ParameterLayout,
        parameters: Vec<f64>,
        fixed_parameters: &[f64],
    ) {
        self.layout = layout;
        self.parameters.write(parameters);
        assign(&mut self.fixed_parameters, fixed_parameters);
    }
}

impl Default for TransformParameterStore {
    fn default() -> Self {
        Self::new(ParameterLayout::default())
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

fn assign(target: &mut CowValue<Vec<f64>>, values: &[f64]) {
    match target.get_mut() {
        Some(current) if current.len() == values.len() => current.copy_from_slice(values),
        _ => target.write(values.to_vec()),
    }
}
